//! Cache key builders for all Sidechain cache entries.
//!
//! Backends add their own prefix (see `cache.redis.key_prefix`).

use uuid::Uuid;

/// Cache key for a user's stored notification preference map.
pub fn notification_preferences(user_id: Uuid) -> String {
    format!("prefs:notif:{user_id}")
}

/// Cache key for one aggregated notification page.
pub fn notification_page(user_id: Uuid, page: u64, page_size: u64) -> String {
    format!("notif:page:{user_id}:{page}:{page_size}")
}

/// Pattern matching every cached notification page of a user.
pub fn notification_pages_pattern(user_id: Uuid) -> String {
    format!("notif:page:{user_id}:*")
}
