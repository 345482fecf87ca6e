//! Primary-store sampling for search reconciliation.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::search::{PostDocument, StoryDocument, UserDocument};

/// Draws random samples of entities from the primary store, already
/// projected into their search documents.
#[async_trait]
pub trait SearchSource: Send + Sync + std::fmt::Debug + 'static {
    /// Up to `limit` random non-deleted posts.
    async fn sample_posts(&self, limit: u32) -> AppResult<Vec<PostDocument>>;

    /// Up to `limit` random users.
    async fn sample_users(&self, limit: u32) -> AppResult<Vec<UserDocument>>;

    /// Up to `limit` random unexpired stories.
    async fn sample_stories(&self, limit: u32) -> AppResult<Vec<StoryDocument>>;
}
