//! Notification preference persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::preferences::NotificationPreferences;

/// Storage for per-user notification preference maps.
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the stored map. `None` when the user never saved preferences.
    async fn load(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>>;

    /// Replace the stored map, creating the row when absent.
    async fn save(&self, user_id: Uuid, preferences: &NotificationPreferences) -> AppResult<()>;
}
