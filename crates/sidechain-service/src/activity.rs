//! Activity-status visibility settings.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use sidechain_core::result::AppResult;
use sidechain_core::traits::ActivitySettingsStore;
use sidechain_core::types::ActivitySettings;
use sidechain_realtime::PresenceTracker;

/// Reads and changes who may see a user's online state.
#[derive(Debug, Clone)]
pub struct ActivityStatusService {
    store: Arc<dyn ActivitySettingsStore>,
    presence: Arc<PresenceTracker>,
}

impl ActivityStatusService {
    /// Creates a service that re-announces presence through `presence`.
    pub fn new(store: Arc<dyn ActivitySettingsStore>, presence: Arc<PresenceTracker>) -> Self {
        Self { store, presence }
    }

    /// Current settings; both flags default to visible.
    pub async fn get(&self, user_id: Uuid) -> AppResult<ActivitySettings> {
        self.store.settings(user_id).await
    }

    /// Apply the provided flags and re-announce presence to followers.
    pub async fn update(
        &self,
        user_id: Uuid,
        show_activity_status: Option<bool>,
        show_last_active: Option<bool>,
    ) -> AppResult<ActivitySettings> {
        let mut settings = self.store.settings(user_id).await?;
        if let Some(show) = show_activity_status {
            settings.show_activity_status = show;
        }
        if let Some(show) = show_last_active {
            settings.show_last_active = show;
        }
        self.store.update_settings(user_id, settings).await?;

        let notified = self.presence.republish(user_id, settings).await;
        info!(
            user_id = %user_id,
            show_activity_status = settings.show_activity_status,
            show_last_active = settings.show_last_active,
            notified,
            "Activity status settings updated"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_core::config::{PresenceConfig, RealtimeConfig};
    use sidechain_database::memory::{InMemoryActivityStore, InMemorySocialGraph};
    use sidechain_realtime::{ConnectionRegistry, OutboundMessage};

    #[tokio::test]
    async fn test_hiding_status_announces_offline_to_followers() {
        let registry = Arc::new(ConnectionRegistry::new(RealtimeConfig::default()));
        let social = Arc::new(InMemorySocialGraph::new());
        let store = Arc::new(InMemoryActivityStore::new());
        let presence = Arc::new(PresenceTracker::new(
            PresenceConfig::default(),
            registry.clone(),
            social.clone(),
            store.clone(),
        ));
        let service = ActivityStatusService::new(store, presence.clone());

        let (user, follower) = (Uuid::new_v4(), Uuid::new_v4());
        social.follow(follower, user);
        let _own = registry.register(user, "u".into());
        presence.connected(user).await;
        let mut watcher = registry.register(follower, "f".into());
        while watcher.receiver.try_recv().is_ok() {}

        let settings = service.update(user, Some(false), None).await.unwrap();
        assert!(!settings.show_activity_status);
        assert!(settings.show_last_active);
        assert_eq!(service.get(user).await.unwrap(), settings);

        match watcher.receiver.try_recv() {
            Ok(OutboundMessage::PresenceChanged(view)) => {
                assert_eq!(view.user_id, user);
                assert!(!view.is_online);
            }
            other => panic!("expected presence_changed, got {other:?}"),
        }
    }
}
