//! Notification preference updates keyed by category name.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use sidechain_core::result::AppResult;
use sidechain_core::types::NotificationPreferences;
use sidechain_realtime::PreferenceGate;

/// Preference reads and partial updates for the REST and CLI surfaces.
#[derive(Debug, Clone)]
pub struct PreferenceService {
    gate: PreferenceGate,
}

impl PreferenceService {
    /// Creates a service over `gate`.
    pub fn new(gate: PreferenceGate) -> Self {
        Self { gate }
    }

    /// Effective preferences with every category present.
    pub async fn get(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        self.gate.preferences(user_id).await
    }

    /// Merge `changes` into the stored map. Unknown category names are
    /// rejected before anything is written.
    pub async fn update(
        &self,
        user_id: Uuid,
        changes: HashMap<String, bool>,
    ) -> AppResult<NotificationPreferences> {
        let changes = NotificationPreferences::from_named(changes)?;
        let effective = self.gate.set_preferences(user_id, &changes).await?;
        info!(user_id = %user_id, changed = changes.0.len(), "Notification preferences updated");
        Ok(effective)
    }

    /// Restore every category to enabled.
    pub async fn reset(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        self.gate.reset(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sidechain_cache::CacheManager;
    use sidechain_core::error::ErrorKind;
    use sidechain_core::events::NotificationCategory;
    use sidechain_database::memory::InMemoryPreferenceStore;

    fn service() -> (PreferenceService, Arc<InMemoryPreferenceStore>) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let gate = PreferenceGate::new(store.clone(), Arc::new(CacheManager::in_memory()), 300);
        (PreferenceService::new(gate), store)
    }

    #[tokio::test]
    async fn test_named_update_merges() {
        let (service, store) = service();
        let user = Uuid::new_v4();

        let updated = service
            .update(user, HashMap::from([("likes".to_string(), false)]))
            .await
            .unwrap();
        assert!(!updated.is_enabled(NotificationCategory::Likes));
        assert!(updated.is_enabled(NotificationCategory::Follows));
        assert!(store.has_row(user));
    }

    #[tokio::test]
    async fn test_unknown_category_writes_nothing() {
        let (service, store) = service();
        let user = Uuid::new_v4();

        let err = service
            .update(user, HashMap::from([("pokes".to_string(), false)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!store.has_row(user));
    }
}
