//! Search reconciliation sweep configuration.

use serde::{Deserialize, Serialize};

/// Reconciliation sweeper configuration.
///
/// Each tick re-indexes an independent random sample; with `N` rows of a
/// kind and a sample of `s` per tick, a given row is expected to be
/// refreshed within roughly `N / s` ticks. No worst-case bound exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Whether the sweeper runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between sweep ticks.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Posts sampled per tick.
    #[serde(default = "default_post_sample")]
    pub post_sample: u32,
    /// Users sampled per tick.
    #[serde(default = "default_user_sample")]
    pub user_sample: u32,
    /// Unexpired stories sampled per tick.
    #[serde(default = "default_story_sample")]
    pub story_sample: u32,
    /// Run one sweep immediately at startup instead of after the first
    /// interval.
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval(),
            post_sample: default_post_sample(),
            user_sample: default_user_sample(),
            story_sample: default_story_sample(),
            run_on_start: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    3600
}

fn default_post_sample() -> u32 {
    100
}

fn default_user_sample() -> u32 {
    50
}

fn default_story_sample() -> u32 {
    50
}
