//! Durable feed store configuration.

use serde::{Deserialize, Serialize};

/// Activity-feed service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Provider: `"http"` for the hosted activity-feed service, `"memory"`
    /// for a process-local store.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the hosted feed API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Name of the per-user notification feed group.
    #[serde(default = "default_feed_group")]
    pub notification_feed_group: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
            notification_feed_group: default_feed_group(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8090/api/v1.0".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_feed_group() -> String {
    "notification".to_string()
}
