//! Activity-status settings and persisted presence columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::ActivitySettingsStore;
use sidechain_core::types::ActivitySettings;
use sidechain_entity::user::UserActivityRow;

/// Visibility flags and presence columns on the `users` table.
#[derive(Debug, Clone)]
pub struct PgActivitySettingsStore {
    pool: PgPool,
}

impl PgActivitySettingsStore {
    /// Create a new activity settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: Uuid) -> AppResult<Option<UserActivityRow>> {
        sqlx::query_as::<_, UserActivityRow>(
            "SELECT id, is_online, last_active_at, show_activity_status, show_last_active \
             FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user activity", e))
    }
}

#[async_trait]
impl ActivitySettingsStore for PgActivitySettingsStore {
    async fn settings(&self, user_id: Uuid) -> AppResult<ActivitySettings> {
        Ok(self
            .find(user_id)
            .await?
            .map(|row| row.settings())
            .unwrap_or_default())
    }

    async fn update_settings(&self, user_id: Uuid, settings: ActivitySettings) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET show_activity_status = $2, show_last_active = $3 WHERE id = $1",
        )
        .bind(user_id)
        .bind(settings.show_activity_status)
        .bind(settings.show_last_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update activity settings", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn record_presence(
        &self,
        user_id: Uuid,
        is_online: bool,
        last_active_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_online = $2, last_active_at = $3 WHERE id = $1")
            .bind(user_id)
            .bind(is_online)
            .bind(last_active_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record presence", e))?;
        Ok(())
    }

    async fn last_active(&self, user_id: Uuid) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.find(user_id).await?.and_then(|row| row.last_active_at))
    }
}
