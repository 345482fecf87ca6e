//! Activity-status settings and last-active persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::presence::ActivitySettings;

/// Storage for visibility settings and persisted presence columns.
#[async_trait]
pub trait ActivitySettingsStore: Send + Sync + std::fmt::Debug + 'static {
    /// Visibility settings; defaults when the user has none stored.
    async fn settings(&self, user_id: Uuid) -> AppResult<ActivitySettings>;

    /// Persist visibility settings.
    async fn update_settings(&self, user_id: Uuid, settings: ActivitySettings) -> AppResult<()>;

    /// Persist the online flag and last-active timestamp.
    async fn record_presence(
        &self,
        user_id: Uuid,
        is_online: bool,
        last_active_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Last persisted activity timestamp.
    async fn last_active(&self, user_id: Uuid) -> AppResult<Option<DateTime<Utc>>>;
}
