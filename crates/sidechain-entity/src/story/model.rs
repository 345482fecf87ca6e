//! Story entity projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sidechain_core::types::StoryDocument;

/// A `stories` row joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoryRow {
    /// Project into the search document.
    pub fn into_document(self) -> StoryDocument {
        StoryDocument {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            duration_seconds: self.duration_seconds,
            view_count: self.view_count,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}
