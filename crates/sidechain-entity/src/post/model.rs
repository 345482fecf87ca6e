//! Audio post entity projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sidechain_core::types::PostDocument;

/// An `audio_posts` row joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub title: Option<String>,
    pub genre: Vec<String>,
    pub bpm: Option<i32>,
    pub musical_key: Option<String>,
    pub daw: Option<String>,
    pub like_count: i64,
    pub play_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl PostRow {
    /// Project into the search document.
    pub fn into_document(self) -> PostDocument {
        PostDocument {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            title: self.title.unwrap_or_default(),
            genre: self.genre,
            bpm: self.bpm.unwrap_or(0),
            key: self.musical_key.unwrap_or_default(),
            daw: self.daw.unwrap_or_default(),
            like_count: self.like_count,
            play_count: self.play_count,
            comment_count: self.comment_count,
            created_at: self.created_at,
        }
    }
}
