//! Aggregated notification rows as shown to the recipient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consecutive feed activities sharing a verb and aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationGroup {
    /// ID of the first activity in the group.
    pub id: Uuid,
    pub verb: String,
    /// `{verb}_{YYYY-MM-DD}`.
    pub aggregation_key: String,
    /// Earliest actor in the group.
    pub first_actor_id: Uuid,
    pub first_actor_name: String,
    /// Distinct actors.
    pub actor_count: u32,
    /// Activities folded into this group.
    pub activity_count: u32,
    /// True only when every activity is read.
    pub is_read: bool,
    /// True only when every activity is seen.
    pub is_seen: bool,
    /// Most recent activity time.
    pub updated_at: DateTime<Utc>,
    /// First non-empty comment or mention text.
    pub preview: Option<String>,
    /// Human-readable summary.
    pub text: String,
    pub activity_ids: Vec<Uuid>,
}

/// One page of aggregated notifications with badge counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPage {
    /// Newest group first.
    pub groups: Vec<NotificationGroup>,
    pub unread: u64,
    pub unseen: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// Current badge counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCounts {
    pub unread: u64,
    pub unseen: u64,
}
