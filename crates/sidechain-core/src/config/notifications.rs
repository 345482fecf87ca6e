//! Notification fan-out configuration.

use serde::{Deserialize, Serialize};

/// Settings for the preference gate and the fan-out router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// TTL in seconds of cached per-user preference maps.
    #[serde(default = "default_preference_ttl")]
    pub preference_cache_ttl_seconds: u64,
    /// Write undelivered events to the durable feed store.
    #[serde(default = "default_true")]
    pub feed_fallback: bool,
    /// Push a `notification_count_update` to live connections after
    /// read/seen changes.
    #[serde(default = "default_true")]
    pub push_count_updates: bool,
    /// TTL in seconds of cached aggregated notification pages.
    #[serde(default = "default_page_ttl")]
    pub page_cache_ttl_seconds: u64,
    /// Characters of comment/mention text kept on stored activities.
    #[serde(default = "default_preview_len")]
    pub stored_preview_length: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            preference_cache_ttl_seconds: default_preference_ttl(),
            feed_fallback: true,
            push_count_updates: true,
            page_cache_ttl_seconds: default_page_ttl(),
            stored_preview_length: default_preview_len(),
        }
    }
}

fn default_preference_ttl() -> u64 {
    300
}

fn default_page_ttl() -> u64 {
    60
}

fn default_preview_len() -> usize {
    100
}

fn default_true() -> bool {
    true
}
