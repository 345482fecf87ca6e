//! Durable notification feed store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::feed::{FeedActivity, NewActivity, NotificationFeed};
use crate::types::pagination::PageRequest;

/// The external activity-feed service used as the fallback delivery path
/// for recipients that are not connected.
#[async_trait]
pub trait FeedStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an activity to `recipient`'s notification feed. Writing the
    /// same activity ID twice must not create a second entry.
    async fn add_activity(&self, recipient: Uuid, activity: NewActivity) -> AppResult<FeedActivity>;

    /// Read one page of `recipient`'s raw activities (oldest first within
    /// the page; pages walk backwards from the newest activity) together
    /// with the unread/unseen counters.
    async fn notifications(&self, recipient: Uuid, page: PageRequest)
    -> AppResult<NotificationFeed>;

    /// Mark every activity read. Returns how many changed.
    async fn mark_all_read(&self, recipient: Uuid) -> AppResult<u64>;

    /// Mark every activity seen. Returns how many changed.
    async fn mark_all_seen(&self, recipient: Uuid) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
