//! Presence tracking configuration.

use serde::{Deserialize, Serialize};

/// Presence tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Delay in milliseconds between a user's last connection closing and
    /// the user being reported offline. A reconnect inside the window
    /// cancels the transition.
    #[serde(default = "default_offline_grace")]
    pub offline_grace_ms: u64,
    /// Seconds without a heartbeat after which a connection is considered
    /// stale and closed by the timeout sweep.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_secs: u64,
    /// Interval of the stale-connection sweep in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Maximum custom status length in characters.
    #[serde(default = "default_max_status_len")]
    pub max_status_length: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            offline_grace_ms: default_offline_grace(),
            heartbeat_timeout_secs: default_heartbeat_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            max_status_length: default_max_status_len(),
        }
    }
}

fn default_offline_grace() -> u64 {
    5000
}

fn default_heartbeat_timeout() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_max_status_len() -> usize {
    100
}
