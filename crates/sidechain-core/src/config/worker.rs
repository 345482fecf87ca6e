//! Background task supervisor configuration.

use serde::{Deserialize, Serialize};

/// Background task supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether background tasks are started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds the supervisor waits for tasks to stop before aborting them.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_shutdown_timeout() -> u64 {
    10
}
