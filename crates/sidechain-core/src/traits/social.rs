//! Read-only view of follow, mute and block relationships.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Social graph queries used by the fan-out router and presence tracker.
#[async_trait]
pub trait SocialGraph: Send + Sync + std::fmt::Debug + 'static {
    /// Users following `user_id`.
    async fn followers(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Users `user_id` follows.
    async fn following(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Whether notifications from `actor` must be suppressed for
    /// `recipient`: the recipient muted or blocked the actor, or the
    /// actor blocked the recipient.
    async fn is_suppressed(&self, recipient: Uuid, actor: Uuid) -> AppResult<bool>;
}
