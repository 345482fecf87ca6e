//! Search index configuration.

use serde::{Deserialize, Serialize};

/// Search index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Provider: `"elasticsearch"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Elasticsearch base URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Optional basic-auth username.
    #[serde(default)]
    pub username: String,
    /// Optional basic-auth password.
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: default_url(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout() -> u64 {
    10
}
