//! User entity projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sidechain_core::types::{ActivitySettings, UserDocument};

/// The searchable subset of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub genre: Vec<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Project into the search document.
    pub fn into_document(self) -> UserDocument {
        UserDocument {
            display_name: self.display_name.unwrap_or_else(|| self.username.clone()),
            id: self.id,
            username: self.username,
            bio: self.bio.unwrap_or_default(),
            genre: self.genre,
            follower_count: self.follower_count,
            created_at: self.created_at,
        }
    }
}

/// Presence and visibility columns of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserActivityRow {
    pub id: Uuid,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub show_activity_status: bool,
    pub show_last_active: bool,
}

impl UserActivityRow {
    /// Visibility settings carried by this row.
    pub fn settings(&self) -> ActivitySettings {
        ActivitySettings {
            show_activity_status: self.show_activity_status,
            show_last_active: self.show_last_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_username() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "kickdrum".into(),
            display_name: None,
            bio: None,
            genre: vec!["techno".into()],
            follower_count: 3,
            created_at: Utc::now(),
        };
        let doc = row.into_document();
        assert_eq!(doc.display_name, "kickdrum");
        assert_eq!(doc.bio, "");
    }
}
