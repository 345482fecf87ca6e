//! PostgreSQL connection pool management.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use sidechain_core::config::DatabaseConfig;
use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::traits::{ActivitySettingsStore, PreferenceStore, SearchSource, SocialGraph};

use crate::repositories::{
    PgActivitySettingsStore, PgPreferenceStore, PgSearchSource, PgSocialGraph,
};

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

/// Every relational store this subsystem reads or writes, behind the core
/// traits.
#[derive(Debug, Clone)]
pub struct Stores {
    pub preferences: Arc<dyn PreferenceStore>,
    pub social: Arc<dyn SocialGraph>,
    pub activity: Arc<dyn ActivitySettingsStore>,
    pub search_source: Arc<dyn SearchSource>,
}

impl DatabasePool {
    /// Connect using the configured pool limits, then run embedded
    /// migrations when enabled.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        if config.run_migrations {
            crate::migration::run_migrations(&pool).await?;
        }

        info!("PostgreSQL pool ready");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build the relational store implementations sharing this pool.
    pub fn stores(&self) -> Stores {
        Stores {
            preferences: Arc::new(PgPreferenceStore::new(self.pool.clone())),
            social: Arc::new(PgSocialGraph::new(self.pool.clone())),
            activity: Arc::new(PgActivitySettingsStore::new(self.pool.clone())),
            search_source: Arc::new(PgSearchSource::new(self.pool.clone())),
        }
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a connection URL for safe logging.
pub fn mask_password(url: &str) -> String {
    let Some(at_pos) = url.find('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at_pos].rfind(':') {
        Some(colon_pos) if colon_pos > scheme_end => {
            format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://sidechain:hunter2@db:5432/sidechain"),
            "postgres://sidechain:****@db:5432/sidechain"
        );
        assert_eq!(
            mask_password("postgres://localhost:5432/sidechain"),
            "postgres://localhost:5432/sidechain"
        );
        assert_eq!(
            mask_password("redis://:pw@cache:6379"),
            "redis://:pw@cache:6379"
        );
    }
}
