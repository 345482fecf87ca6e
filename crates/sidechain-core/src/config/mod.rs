//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default so an empty file boots against
//! local services.

pub mod auth;
pub mod cache;
pub mod database;
pub mod feed;
pub mod logging;
pub mod notifications;
pub mod presence;
pub mod realtime;
pub mod reconciliation;
pub mod search;
pub mod server;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::feed::FeedConfig;
pub use self::logging::LoggingConfig;
pub use self::notifications::NotificationConfig;
pub use self::presence::PresenceConfig;
pub use self::realtime::RealtimeConfig;
pub use self::reconciliation::ReconciliationConfig;
pub use self::search::SearchConfig;
pub use self::server::{CorsConfig, ServerConfig};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// WebSocket connection settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Presence tracking settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Notification fan-out settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Durable feed store settings.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Search index settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Search reconciliation sweep settings.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Background task supervisor settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SIDECHAIN__`
    /// (e.g. `SIDECHAIN__SERVER__PORT=9000`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SIDECHAIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single explicit file path, without the
    /// environment overlay. Used by the CLI's `--config` flag.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SIDECHAIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.presence.offline_grace_ms, 5000);
        assert_eq!(config.reconciliation.interval_secs, 3600);
        assert_eq!(config.reconciliation.post_sample, 100);
        assert_eq!(config.reconciliation.user_sample, 50);
        assert_eq!(config.realtime.channel_buffer_size, 256);
        assert_eq!(config.realtime.max_message_size, 512 * 1024);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"presence": {"offline_grace_ms": 250}}"#).unwrap();
        assert_eq!(config.presence.offline_grace_ms, 250);
        assert_eq!(config.presence.heartbeat_timeout_secs, 300);
    }
}
