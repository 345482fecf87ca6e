//! Search index document projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index holding user documents.
pub const USERS_INDEX: &str = "users";
/// Index holding post documents.
pub const POSTS_INDEX: &str = "posts";
/// Index holding story documents.
pub const STORIES_INDEX: &str = "stories";

/// A document that can be written to the search index.
pub trait SearchDocument: Serialize + Send + Sync {
    /// Target index name.
    const INDEX: &'static str;

    /// Document ID within the index.
    fn document_id(&self) -> String;
}

/// Searchable projection of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub genre: Vec<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
}

impl SearchDocument for UserDocument {
    const INDEX: &'static str = USERS_INDEX;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

/// Searchable projection of an audio post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub title: String,
    pub genre: Vec<String>,
    pub bpm: i32,
    pub key: String,
    pub daw: String,
    pub like_count: i64,
    pub play_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl SearchDocument for PostDocument {
    const INDEX: &'static str = POSTS_INDEX;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

/// Searchable projection of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SearchDocument for StoryDocument {
    const INDEX: &'static str = STORIES_INDEX;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
