//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum simultaneous WebSocket connections per user. The oldest
    /// connection is evicted when a new one would exceed the limit.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Bounded outbound queue size per connection. A full queue drops the
    /// newest message for that connection only.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Server-initiated WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without any client frame before the heartbeat loop closes
    /// the connection.
    #[serde(default = "default_pong_timeout")]
    pub pong_timeout_seconds: u64,
    /// Maximum inbound text frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Inbound messages replenished per second per connection.
    #[serde(default = "default_rate_per_second")]
    pub rate_limit_per_second: u32,
    /// Inbound burst allowance per connection.
    #[serde(default = "default_rate_burst")]
    pub rate_limit_burst: u32,
    /// Seconds allowed for outbound queues to flush on shutdown.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            pong_timeout_seconds: default_pong_timeout(),
            max_message_size: default_max_message_size(),
            rate_limit_per_second: default_rate_per_second(),
            rate_limit_burst: default_rate_burst(),
            drain_timeout_seconds: default_drain_timeout(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    54
}

fn default_pong_timeout() -> u64 {
    60
}

fn default_max_message_size() -> usize {
    512 * 1024
}

fn default_rate_per_second() -> u32 {
    10
}

fn default_rate_burst() -> u32 {
    20
}

fn default_drain_timeout() -> u64 {
    5
}
