//! Notification preference gate.
//!
//! Reads fail open: a missing row, a missing category, or a store or
//! cache outage all mean "deliver".

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use sidechain_cache::keys;
use sidechain_core::events::NotificationCategory;
use sidechain_core::result::AppResult;
use sidechain_core::traits::cache::CacheProviderExt;
use sidechain_core::traits::{CacheProvider, PreferenceStore};
use sidechain_core::types::NotificationPreferences;

/// Decides per recipient and category whether an event is delivered.
#[derive(Debug, Clone)]
pub struct PreferenceGate {
    store: Arc<dyn PreferenceStore>,
    cache: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl PreferenceGate {
    /// Creates a gate over `store`, caching rows for `ttl_seconds`.
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        cache: Arc<dyn CacheProvider>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            cache,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Whether `user_id` wants events of `category`.
    pub async fn is_enabled(&self, user_id: Uuid, category: NotificationCategory) -> bool {
        match self.stored(user_id).await {
            Ok(prefs) => prefs.is_enabled(category),
            Err(e) => {
                warn!(user_id = %user_id, category = %category, error = %e, "Preference lookup failed, delivering");
                true
            }
        }
    }

    /// The effective map with every known category present.
    pub async fn preferences(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        Ok(self.stored(user_id).await?.effective())
    }

    /// Merge `changes` onto the stored map, creating the row if needed.
    /// Returns the effective map.
    pub async fn set_preferences(
        &self,
        user_id: Uuid,
        changes: &NotificationPreferences,
    ) -> AppResult<NotificationPreferences> {
        let mut current = self.store.load(user_id).await?.unwrap_or_default();
        current.merge(changes);
        self.store.save(user_id, &current).await?;
        self.invalidate(user_id).await;

        debug!(user_id = %user_id, changed = changes.0.len(), "Notification preferences updated");
        Ok(current.effective())
    }

    /// Enable every category again.
    pub async fn reset(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        let all = NotificationPreferences::default().effective();
        self.store.save(user_id, &all).await?;
        self.invalidate(user_id).await;
        Ok(all)
    }

    async fn stored(&self, user_id: Uuid) -> AppResult<NotificationPreferences> {
        let key = keys::notification_preferences(user_id);
        match self.cache.get_json::<NotificationPreferences>(&key).await {
            Ok(Some(prefs)) => return Ok(prefs),
            Ok(None) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Preference cache read failed"),
        }

        let prefs = self.store.load(user_id).await?.unwrap_or_default();
        if let Err(e) = self.cache.set_json(&key, &prefs, self.ttl).await {
            warn!(user_id = %user_id, error = %e, "Preference cache write failed");
        }
        Ok(prefs)
    }

    async fn invalidate(&self, user_id: Uuid) {
        if let Err(e) = self
            .cache
            .delete(&keys::notification_preferences(user_id))
            .await
        {
            warn!(user_id = %user_id, error = %e, "Preference cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_cache::CacheManager;
    use sidechain_database::memory::InMemoryPreferenceStore;

    fn gate() -> (PreferenceGate, Arc<InMemoryPreferenceStore>) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let cache = Arc::new(CacheManager::in_memory());
        (PreferenceGate::new(store.clone(), cache, 300), store)
    }

    #[tokio::test]
    async fn test_missing_row_enables_everything() {
        let (gate, store) = gate();
        let user = Uuid::new_v4();
        for category in NotificationCategory::ALL {
            assert!(gate.is_enabled(user, category).await);
        }
        assert!(!store.has_row(user));
    }

    #[tokio::test]
    async fn test_set_merges_and_invalidates_cache() {
        let (gate, store) = gate();
        let user = Uuid::new_v4();
        // Prime the cache with the default map.
        assert!(gate.is_enabled(user, NotificationCategory::Follows).await);

        let changes = NotificationPreferences::from_named([("follows", false)]).unwrap();
        let effective = gate.set_preferences(user, &changes).await.unwrap();
        assert!(store.has_row(user));
        assert!(!effective.is_enabled(NotificationCategory::Follows));
        assert_eq!(effective.0.len(), NotificationCategory::ALL.len());
        assert!(!gate.is_enabled(user, NotificationCategory::Follows).await);

        let changes = NotificationPreferences::from_named([("likes", false)]).unwrap();
        let effective = gate.set_preferences(user, &changes).await.unwrap();
        assert!(!effective.is_enabled(NotificationCategory::Follows));
        assert!(!effective.is_enabled(NotificationCategory::Likes));

        let reset = gate.reset(user).await.unwrap();
        assert!(reset.is_enabled(NotificationCategory::Follows));
        assert!(gate.is_enabled(user, NotificationCategory::Likes).await);
    }

    #[tokio::test]
    async fn test_store_outage_fails_open() {
        let (gate, store) = gate();
        let user = Uuid::new_v4();
        store.set_unavailable(true);
        assert!(gate.is_enabled(user, NotificationCategory::Dms).await);
        assert!(gate.preferences(user).await.is_err());
    }
}
