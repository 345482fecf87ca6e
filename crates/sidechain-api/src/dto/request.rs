//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use sidechain_core::types::PresenceStatus;

/// Body of `PUT /settings/activity-status`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateActivityStatusRequest {
    pub show_activity_status: Option<bool>,
    pub show_last_active: Option<bool>,
}

/// Body of `PUT /presence/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePresenceRequest {
    /// New status; `offline` is rejected.
    pub status: Option<PresenceStatus>,
    /// Custom status text; an empty string clears it.
    #[validate(length(max = 280, message = "Custom status is too long"))]
    pub custom_status: Option<String>,
    /// DAW name; kept only with `in_studio`.
    #[validate(length(max = 100, message = "DAW name is too long"))]
    pub daw: Option<String>,
}

/// Body of `POST /presence/bulk` and `POST /ws/online`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BulkPresenceRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 user IDs are required"))]
    pub user_ids: Vec<Uuid>,
}
