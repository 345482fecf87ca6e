//! Event fan-out router.
//!
//! Each recipient is handled on its own: suppression check, preference
//! gate, live push, then the durable feed when nobody was connected. A
//! failure for one recipient never stops the rest. A feed write drops the
//! recipient's cached notification pages so the next poll sees it.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use sidechain_cache::keys;
use sidechain_core::config::NotificationConfig;
use sidechain_core::events::DomainEvent;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{CacheProvider, FeedStore, SocialGraph};
use sidechain_core::types::NewActivity;

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;
use crate::preferences::PreferenceGate;

/// Per-dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Recipients reached on at least one live connection.
    pub delivered: u32,
    /// Recipients written to the durable feed.
    pub persisted: u32,
    /// Recipients skipped because of a mute or block.
    pub skipped_muted: u32,
    /// Recipients skipped because the category is disabled.
    pub skipped_disabled: u32,
    /// Recipients whose handling failed.
    pub failed: u32,
}

enum Outcome {
    Delivered,
    Persisted,
    Missed,
    Muted,
    Disabled,
}

/// Routes domain events to recipients.
#[derive(Debug, Clone)]
pub struct FanoutRouter {
    registry: Arc<ConnectionRegistry>,
    gate: PreferenceGate,
    social: Arc<dyn SocialGraph>,
    feed: Arc<dyn FeedStore>,
    cache: Arc<dyn CacheProvider>,
    config: NotificationConfig,
}

impl FanoutRouter {
    /// Creates a router.
    pub fn new(
        config: NotificationConfig,
        registry: Arc<ConnectionRegistry>,
        gate: PreferenceGate,
        social: Arc<dyn SocialGraph>,
        feed: Arc<dyn FeedStore>,
        cache: Arc<dyn CacheProvider>,
    ) -> Self {
        Self {
            registry,
            gate,
            social,
            feed,
            cache,
            config,
        }
    }

    /// Fan an event out to its recipients.
    pub async fn dispatch(&self, event: &DomainEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        let recipients = match self.recipients(event).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Could not resolve recipients");
                report.failed += 1;
                return report;
            }
        };
        let message = OutboundMessage::from_event(event);

        for recipient in recipients {
            match self.deliver(event, &message, recipient).await {
                Ok(Outcome::Delivered) => report.delivered += 1,
                Ok(Outcome::Persisted) => report.persisted += 1,
                Ok(Outcome::Missed) => {}
                Ok(Outcome::Muted) => report.skipped_muted += 1,
                Ok(Outcome::Disabled) => report.skipped_disabled += 1,
                Err(e) => {
                    warn!(event_id = %event.id, recipient = %recipient, error = %e, "Delivery failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            event_id = %event.id,
            category = %event.category(),
            delivered = report.delivered,
            persisted = report.persisted,
            skipped_muted = report.skipped_muted,
            skipped_disabled = report.skipped_disabled,
            failed = report.failed,
            "Event dispatched"
        );
        report
    }

    /// Explicit recipients, or the actor's followers for broadcast kinds.
    /// Deduplicated in order, never including the actor.
    async fn recipients(&self, event: &DomainEvent) -> AppResult<Vec<Uuid>> {
        let candidates = if event.recipients.is_empty() && event.payload.targets_followers() {
            self.social.followers(event.actor.id).await?
        } else {
            event.recipients.clone()
        };

        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|r| *r != event.actor.id && seen.insert(*r))
            .collect())
    }

    async fn deliver(
        &self,
        event: &DomainEvent,
        message: &OutboundMessage,
        recipient: Uuid,
    ) -> AppResult<Outcome> {
        if self.social.is_suppressed(recipient, event.actor.id).await? {
            debug!(event_id = %event.id, recipient = %recipient, "Suppressed by mute or block");
            return Ok(Outcome::Muted);
        }

        if !self.gate.is_enabled(recipient, event.category()).await {
            debug!(event_id = %event.id, recipient = %recipient, category = %event.category(), "Category disabled");
            return Ok(Outcome::Disabled);
        }

        if self.registry.send(recipient, message) > 0 {
            return Ok(Outcome::Delivered);
        }

        let Some(verb) = event.payload.feed_verb().filter(|_| self.config.feed_fallback) else {
            return Ok(Outcome::Missed);
        };

        let preview = event.payload.preview().map(|text| {
            text.chars()
                .take(self.config.stored_preview_length)
                .collect::<String>()
        });
        self.feed
            .add_activity(
                recipient,
                NewActivity {
                    id: event.id,
                    actor_id: event.actor.id,
                    actor_name: event.actor.name.clone(),
                    verb: verb.to_string(),
                    object_id: event.payload.object_id(),
                    preview,
                    created_at: event.timestamp,
                },
            )
            .await?;
        self.invalidate_pages(recipient).await;
        Ok(Outcome::Persisted)
    }

    async fn invalidate_pages(&self, recipient: Uuid) {
        match self
            .cache
            .delete_pattern(&keys::notification_pages_pattern(recipient))
            .await
        {
            Ok(dropped) => debug!(recipient = %recipient, dropped, "Cached notification pages dropped"),
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "Failed to drop cached notification pages")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_cache::CacheManager;
    use sidechain_core::config::RealtimeConfig;
    use sidechain_core::events::{Actor, EventPayload};
    use sidechain_core::traits::PreferenceStore;
    use std::time::Duration;
    use sidechain_core::types::NotificationPreferences;
    use sidechain_database::memory::{InMemoryPreferenceStore, InMemorySocialGraph};
    use sidechain_feed::providers::InMemoryFeedStore;

    struct Fixture {
        registry: Arc<ConnectionRegistry>,
        social: Arc<InMemorySocialGraph>,
        prefs: Arc<InMemoryPreferenceStore>,
        feed: Arc<InMemoryFeedStore>,
        cache: Arc<CacheManager>,
        router: FanoutRouter,
    }

    fn fixture() -> Fixture {
        fixture_with(RealtimeConfig::default())
    }

    fn fixture_with(realtime: RealtimeConfig) -> Fixture {
        let registry = Arc::new(ConnectionRegistry::new(realtime));
        let social = Arc::new(InMemorySocialGraph::new());
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let feed = Arc::new(InMemoryFeedStore::new());
        let cache = Arc::new(CacheManager::in_memory());
        let gate = PreferenceGate::new(prefs.clone(), cache.clone(), 300);
        let router = FanoutRouter::new(
            NotificationConfig::default(),
            registry.clone(),
            gate,
            social.clone(),
            feed.clone(),
            cache.clone(),
        );
        Fixture {
            registry,
            social,
            prefs,
            feed,
            cache,
            router,
        }
    }

    fn actor() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            name: "alice".into(),
        }
    }

    fn liked(actor: &Actor, recipients: Vec<Uuid>) -> DomainEvent {
        DomainEvent::new(
            actor.clone(),
            recipients,
            EventPayload::PostLiked {
                post_id: Uuid::new_v4(),
                emoji: None,
            },
        )
    }

    #[tokio::test]
    async fn test_follow_reaches_connected_followee() {
        let f = fixture();
        let alice = actor();
        let bob = Uuid::new_v4();
        let mut bob_conn = f.registry.register(bob, "bob".into());

        let event = DomainEvent::new(
            alice.clone(),
            vec![bob],
            EventPayload::UserFollowed { followee_id: bob },
        );
        let report = f.router.dispatch(&event).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.persisted, 0);
        match bob_conn.receiver.recv().await {
            Some(OutboundMessage::UserFollowed(notice)) => {
                assert_eq!(notice.actor, alice);
                assert_eq!(notice.event_id, event.id);
            }
            other => panic!("expected user_followed, got {other:?}"),
        }
        assert_eq!(f.feed.write_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_recipient_gets_feed_entry() {
        let f = fixture();
        let alice = actor();
        let carol = Uuid::new_v4();

        let event = DomainEvent::new(
            alice.clone(),
            vec![carol],
            EventPayload::PostCommented {
                post_id: Uuid::new_v4(),
                comment_id: Uuid::new_v4(),
                preview: "x".repeat(300),
            },
        );
        let report = f.router.dispatch(&event).await;

        assert_eq!(report.persisted, 1);
        let stored = f.feed.activities(carol);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, event.id);
        assert_eq!(stored[0].verb, "comment");
        assert_eq!(stored[0].preview.as_ref().map(|p| p.len()), Some(100));
    }

    #[tokio::test]
    async fn test_disabled_category_means_no_push_and_no_feed_write() {
        let f = fixture();
        let alice = actor();
        let (online, offline) = (Uuid::new_v4(), Uuid::new_v4());
        let mut conn = f.registry.register(online, "o".into());
        let off = NotificationPreferences::from_named([("likes", false)]).unwrap();
        f.prefs.save(online, &off).await.unwrap();
        f.prefs.save(offline, &off).await.unwrap();

        let report = f.router.dispatch(&liked(&alice, vec![online, offline])).await;

        assert_eq!(report.skipped_disabled, 2);
        assert_eq!(report.delivered, 0);
        assert_eq!(f.feed.write_count(), 0);
        assert!(conn.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_muted_and_blocked_recipients_are_skipped() {
        let f = fixture();
        let alice = actor();
        let (muter, blocked, fine) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        f.social.mute(muter, alice.id);
        f.social.block(alice.id, blocked);

        let report = f
            .router
            .dispatch(&liked(&alice, vec![muter, blocked, fine]))
            .await;
        assert_eq!(report.skipped_muted, 2);
        assert_eq!(report.persisted, 1);
    }

    #[tokio::test]
    async fn test_actor_and_duplicates_are_dropped() {
        let f = fixture();
        let alice = actor();
        let bob = Uuid::new_v4();
        let _conn = f.registry.register(bob, "bob".into());

        let report = f
            .router
            .dispatch(&liked(&alice, vec![bob, alice.id, bob]))
            .await;
        assert_eq!(report.delivered, 1);
        assert_eq!(report, DispatchReport { delivered: 1, ..Default::default() });
    }

    #[tokio::test]
    async fn test_new_post_fans_out_to_followers_live_only() {
        let f = fixture();
        let alice = actor();
        let (online, offline) = (Uuid::new_v4(), Uuid::new_v4());
        f.social.follow(online, alice.id);
        f.social.follow(offline, alice.id);
        let mut conn = f.registry.register(online, "o".into());

        let event = DomainEvent::new(
            alice,
            vec![],
            EventPayload::NewPost {
                post_id: Uuid::new_v4(),
                title: Some("late night loop".into()),
            },
        );
        let report = f.router.dispatch(&event).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.persisted, 0);
        assert!(matches!(
            conn.receiver.recv().await,
            Some(OutboundMessage::NewPost(_))
        ));
        assert_eq!(f.feed.write_count(), 0);
    }

    #[tokio::test]
    async fn test_feed_failure_is_isolated_per_recipient() {
        let f = fixture();
        let alice = actor();
        let (offline, online) = (Uuid::new_v4(), Uuid::new_v4());
        let _conn = f.registry.register(online, "o".into());
        f.feed.set_unavailable(true);

        let report = f.router.dispatch(&liked(&alice, vec![offline, online])).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
    }

    #[tokio::test]
    async fn test_feed_write_drops_recipient_cached_pages() {
        let f = fixture();
        let alice = actor();
        let (carol, dave) = (Uuid::new_v4(), Uuid::new_v4());
        let carol_page = keys::notification_page(carol, 1, 20);
        let dave_page = keys::notification_page(dave, 1, 20);
        f.cache.set_default(&carol_page, "{}").await.unwrap();
        f.cache.set_default(&dave_page, "{}").await.unwrap();

        let report = f.router.dispatch(&liked(&alice, vec![carol])).await;

        assert_eq!(report.persisted, 1);
        assert!(!f.cache.exists(&carol_page).await.unwrap());
        assert!(f.cache.exists(&dave_page).await.unwrap());
    }

    #[tokio::test]
    async fn test_full_queue_does_not_hold_up_other_recipients() {
        let f = fixture_with(RealtimeConfig {
            channel_buffer_size: 1,
            ..RealtimeConfig::default()
        });
        let alice = actor();
        let (slow, fast) = (Uuid::new_v4(), Uuid::new_v4());
        let _slow_conn = f.registry.register(slow, "slow".into());
        let mut fast_conn = f.registry.register(fast, "fast".into());
        // Fill the slow reader's only slot.
        assert_eq!(
            f.registry.send(
                slow,
                &OutboundMessage::NotificationCountUpdate {
                    unread: 1,
                    unseen: 1
                }
            ),
            1
        );

        let report = tokio::time::timeout(
            Duration::from_secs(1),
            f.router.dispatch(&liked(&alice, vec![slow, fast])),
        )
        .await
        .expect("dispatch must not wait on a full queue");

        let received = tokio::time::timeout(Duration::from_secs(1), fast_conn.receiver.recv())
            .await
            .expect("live recipient served within the same dispatch");
        assert!(matches!(received, Some(OutboundMessage::PostLiked(_))));
        assert_eq!(report.delivered, 1);
        // Nothing reached the slow reader, so it falls back to the feed.
        assert_eq!(report.persisted, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(f.registry.metrics().messages_dropped, 1);
        assert!(f.registry.is_online(&slow));
    }

    #[tokio::test]
    async fn test_social_graph_outage_skips_recipient() {
        let f = fixture();
        let alice = actor();
        f.social.set_unavailable(true);

        let report = f.router.dispatch(&liked(&alice, vec![Uuid::new_v4()])).await;
        assert_eq!(report.failed, 1);
        assert_eq!(f.feed.write_count(), 0);
    }
}
