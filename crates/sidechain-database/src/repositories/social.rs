//! Follow, mute and block lookups.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::SocialGraph;

/// Read-only social graph over the `follows`, `user_mutes` and
/// `user_blocks` tables.
#[derive(Debug, Clone)]
pub struct PgSocialGraph {
    pool: PgPool,
}

impl PgSocialGraph {
    /// Create a new social graph repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraph for PgSocialGraph {
    async fn followers(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT follower_id FROM follows WHERE following_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list followers", e))
    }

    async fn following(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT following_id FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list followees", e))
    }

    async fn is_suppressed(&self, recipient: Uuid, actor: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_mutes WHERE user_id = $1 AND muted_user_id = $2) \
                 OR EXISTS (SELECT 1 FROM user_blocks \
                            WHERE (blocker_id = $1 AND blocked_id = $2) \
                               OR (blocker_id = $2 AND blocked_id = $1))",
        )
        .bind(recipient)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check mute/block status", e)
        })
    }
}
