//! Notification preference entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sidechain_core::types::NotificationPreferences;

/// Per-user notification preferences as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreferenceRow {
    /// The user these preferences belong to.
    pub user_id: Uuid,
    /// Preferences as a JSON object of category name to bool:
    ///
    /// ```json
    /// { "likes": true, "follows": false, "dms": true }
    /// ```
    pub preferences: serde_json::Value,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When preferences were last updated.
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreferenceRow {
    /// Decode the stored map, ignoring unknown categories.
    pub fn to_preferences(&self) -> NotificationPreferences {
        NotificationPreferences::from_json_lenient(&self.preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_core::events::NotificationCategory;

    #[test]
    fn test_to_preferences_ignores_garbage() {
        let row = NotificationPreferenceRow {
            user_id: Uuid::new_v4(),
            preferences: serde_json::json!({ "comments": false, "legacy_email": true }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let prefs = row.to_preferences();
        assert!(!prefs.is_enabled(NotificationCategory::Comments));
        assert!(prefs.is_enabled(NotificationCategory::Likes));
    }
}
