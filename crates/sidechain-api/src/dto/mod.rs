//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::{BulkPresenceRequest, UpdateActivityStatusRequest, UpdatePresenceRequest};
pub use response::{
    ApiResponse, BulkPresenceResponse, ComponentHealth, FriendsInStudioResponse, HealthResponse,
    OnlineStatusResponse, RealtimeMetricsResponse,
};
