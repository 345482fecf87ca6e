//! Response DTOs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sidechain_entity::presence::{PresenceView, StudioFriend};
use sidechain_realtime::RegistryMetrics;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Users with at least one connection.
    pub online_users: usize,
    pub components: Vec<ComponentHealth>,
}

/// Reachability of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Presence of several users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPresenceResponse {
    pub presence: Vec<PresenceView>,
    /// Subjects shown as online to the caller.
    pub online_count: usize,
}

/// Online flags keyed by user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineStatusResponse {
    pub statuses: HashMap<Uuid, bool>,
}

/// Followed users currently in the studio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendsInStudioResponse {
    pub count: usize,
    pub friends: Vec<StudioFriend>,
}

/// WebSocket counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMetricsResponse {
    pub websocket: RegistryMetrics,
    pub timestamp: DateTime<Utc>,
}
