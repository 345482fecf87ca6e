//! Random entity samples for search reconciliation.

use async_trait::async_trait;
use sqlx::PgPool;

use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::SearchSource;
use sidechain_core::types::{PostDocument, StoryDocument, UserDocument};
use sidechain_entity::post::PostRow;
use sidechain_entity::story::StoryRow;
use sidechain_entity::user::UserRow;

/// Samples rows with `ORDER BY random()` and projects them to documents.
#[derive(Debug, Clone)]
pub struct PgSearchSource {
    pool: PgPool,
}

impl PgSearchSource {
    /// Create a new search source.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSource for PgSearchSource {
    async fn sample_posts(&self, limit: u32) -> AppResult<Vec<PostDocument>> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT p.id, p.user_id, u.username, p.title, p.genre, p.bpm, p.musical_key, p.daw, \
                    p.like_count, p.play_count, p.comment_count, p.created_at \
             FROM audio_posts p JOIN users u ON u.id = p.user_id \
             WHERE p.deleted_at IS NULL \
             ORDER BY random() LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sample posts", e))?;

        Ok(rows.into_iter().map(PostRow::into_document).collect())
    }

    async fn sample_users(&self, limit: u32) -> AppResult<Vec<UserDocument>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, display_name, bio, genre, follower_count, created_at \
             FROM users WHERE deleted_at IS NULL \
             ORDER BY random() LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sample users", e))?;

        Ok(rows.into_iter().map(UserRow::into_document).collect())
    }

    async fn sample_stories(&self, limit: u32) -> AppResult<Vec<StoryDocument>> {
        let rows = sqlx::query_as::<_, StoryRow>(
            "SELECT s.id, s.user_id, u.username, s.duration_seconds, s.view_count, \
                    s.expires_at, s.created_at \
             FROM stories s JOIN users u ON u.id = s.user_id \
             WHERE s.expires_at > NOW() \
             ORDER BY random() LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sample stories", e))?;

        Ok(rows.into_iter().map(StoryRow::into_document).collect())
    }
}
