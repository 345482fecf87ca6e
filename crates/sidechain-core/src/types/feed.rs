//! Activities stored in the durable notification feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Build the aggregation key for a verb at a point in time.
///
/// Activities sharing a key (same verb, same UTC day) collapse into one
/// notification row.
pub fn aggregation_key(verb: &str, at: DateTime<Utc>) -> String {
    format!("{verb}_{}", at.format("%Y-%m-%d"))
}

/// An activity to append to a user's notification feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    /// Source event ID. Reused as the activity ID so duplicate writes of
    /// the same event collapse.
    pub id: Uuid,
    /// Actor user ID.
    pub actor_id: Uuid,
    /// Actor display name.
    pub actor_name: String,
    /// Verb (`like`, `follow`, `comment`, ...).
    pub verb: String,
    /// Object the verb applies to.
    pub object_id: Uuid,
    /// Truncated comment or mention text.
    pub preview: Option<String>,
    /// When the source event happened.
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    /// The aggregation key for this activity.
    pub fn aggregation_key(&self) -> String {
        aggregation_key(&self.verb, self.created_at)
    }
}

/// A stored notification-feed activity as read back for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedActivity {
    /// Activity (event) ID.
    pub id: Uuid,
    /// Actor user ID.
    pub actor_id: Uuid,
    /// Actor display name; may be empty.
    #[serde(default)]
    pub actor_name: String,
    /// Verb.
    pub verb: String,
    /// Object ID.
    pub object_id: Uuid,
    /// Comment or mention text.
    #[serde(default)]
    pub preview: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
    /// `{verb}_{YYYY-MM-DD}`.
    pub aggregation_key: String,
    /// Whether the recipient has read it.
    #[serde(default)]
    pub is_read: bool,
    /// Whether the recipient has seen it.
    #[serde(default)]
    pub is_seen: bool,
}

impl FeedActivity {
    /// Materialize a stored activity from a new one, unread and unseen.
    pub fn from_new(activity: NewActivity) -> Self {
        let aggregation_key = activity.aggregation_key();
        Self {
            id: activity.id,
            actor_id: activity.actor_id,
            actor_name: activity.actor_name,
            verb: activity.verb,
            object_id: activity.object_id,
            preview: activity.preview,
            created_at: activity.created_at,
            aggregation_key,
            is_read: false,
            is_seen: false,
        }
    }
}

/// One page of raw activities plus the recipient's badge counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFeed {
    /// Activities, oldest first.
    pub activities: Vec<FeedActivity>,
    /// Unread activity count across the whole feed.
    pub unread: u64,
    /// Unseen activity count across the whole feed.
    pub unseen: u64,
    /// Whether older activities exist beyond this page.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_aggregation_key_is_verb_and_utc_day() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(aggregation_key("like", at), "like_2025-03-09");
    }
}
