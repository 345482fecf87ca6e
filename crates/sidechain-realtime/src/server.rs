//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sidechain_core::config::{AppConfig, PresenceConfig, RealtimeConfig};
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{
    ActivitySettingsStore, CacheProvider, FeedStore, PreferenceStore, SocialGraph,
};

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::{ConnectionRegistry, Registration};
use crate::message::types::{InboundMessage, OutboundMessage, SystemEvent};
use crate::preferences::PreferenceGate;
use crate::presence::tracker::{PresenceTracker, StatusChange};
use crate::router::FanoutRouter;

/// Collaborators the engine reads from and writes to.
#[derive(Debug, Clone)]
pub struct EngineDeps {
    /// Follow, mute and block relationships.
    pub social: Arc<dyn SocialGraph>,
    /// Visibility settings and persisted presence columns.
    pub activity: Arc<dyn ActivitySettingsStore>,
    /// Notification preference rows.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Durable notification feed.
    pub feed: Arc<dyn FeedStore>,
    /// Shared cache.
    pub cache: Arc<dyn CacheProvider>,
}

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Notification preference gate.
    pub gate: PreferenceGate,
    /// Event fan-out router.
    pub router: FanoutRouter,
    social: Arc<dyn SocialGraph>,
    config: RealtimeConfig,
    presence_config: PresenceConfig,
    shutting_down: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: &AppConfig, deps: EngineDeps) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.realtime.clone()));
        let presence = Arc::new(PresenceTracker::new(
            config.presence.clone(),
            registry.clone(),
            deps.social.clone(),
            deps.activity.clone(),
        ));
        let gate = PreferenceGate::new(
            deps.preferences.clone(),
            deps.cache.clone(),
            config.notifications.preference_cache_ttl_seconds,
        );
        let router = FanoutRouter::new(
            config.notifications.clone(),
            registry.clone(),
            gate.clone(),
            deps.social.clone(),
            deps.feed.clone(),
            deps.cache.clone(),
        );

        info!("Real-time engine initialized");

        Self {
            registry,
            presence,
            gate,
            router,
            social: deps.social,
            config: config.realtime.clone(),
            presence_config: config.presence.clone(),
            shutting_down: CancellationToken::new(),
        }
    }

    /// WebSocket settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Register an authenticated socket and mark the user online if this
    /// is their first connection.
    pub async fn connect(&self, user_id: Uuid, username: String) -> AppResult<Registration> {
        if self.shutting_down.is_cancelled() {
            return Err(AppError::service_unavailable("Server is shutting down"));
        }

        let registration = self.registry.register(user_id, username);
        registration.handle.try_deliver(OutboundMessage::System {
            event: SystemEvent::Connected,
        });
        if registration.first_for_user {
            self.presence.connected(user_id).await;
        }
        Ok(registration)
    }

    /// Remove a socket. Losing the last one starts the offline grace timer.
    pub async fn disconnect(&self, handle: &ConnectionHandle) {
        self.registry.unregister(&handle.id);
        if !self.shutting_down.is_cancelled() && !self.registry.is_online(&handle.user_id) {
            self.presence.schedule_offline(handle.user_id);
        }
    }

    /// Act on one parsed client message.
    pub async fn handle_message(
        &self,
        handle: &ConnectionHandle,
        message: InboundMessage,
    ) -> AppResult<()> {
        handle.touch();
        match message {
            InboundMessage::Ping { client_time } => {
                self.presence.heartbeat(handle.user_id);
                handle.try_deliver(OutboundMessage::Pong {
                    client_time,
                    server_time: chrono::Utc::now().timestamp_millis(),
                });
            }
            InboundMessage::Heartbeat => {
                self.presence.heartbeat(handle.user_id);
            }
            InboundMessage::PresenceUpdate {
                status,
                custom_status,
                daw,
            } => {
                self.presence
                    .update_status(
                        handle.user_id,
                        StatusChange {
                            status,
                            custom_status: custom_status.as_deref(),
                            daw: daw.as_deref(),
                        },
                    )
                    .await?;
            }
            InboundMessage::TypingStart { post_id } => {
                self.relay_typing(
                    handle.user_id,
                    OutboundMessage::UserTyping {
                        user_id: handle.user_id,
                        post_id,
                    },
                )
                .await;
            }
            InboundMessage::TypingStop { post_id } => {
                self.relay_typing(
                    handle.user_id,
                    OutboundMessage::UserStopTyping {
                        user_id: handle.user_id,
                        post_id,
                    },
                )
                .await;
            }
        }
        Ok(())
    }

    /// Relay a typing indicator to the typist's connected followers.
    async fn relay_typing(&self, user_id: Uuid, message: OutboundMessage) -> usize {
        match self.social.followers(user_id).await {
            Ok(followers) => {
                let followers: std::collections::HashSet<Uuid> = followers.into_iter().collect();
                self.registry
                    .broadcast(|u| followers.contains(&u), &message)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Follower lookup failed, typing not relayed");
                0
            }
        }
    }

    /// Close and remove connections that have not pinged within
    /// `presence.heartbeat_timeout_secs`.
    pub async fn sweep_stale(&self) -> usize {
        let timeout = Duration::from_secs(self.presence_config.heartbeat_timeout_secs);
        let stale = self.registry.stale_connections(timeout);
        for handle in &stale {
            warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                last_ping = %handle.last_ping(),
                "Closing stale connection"
            );
            handle.close();
            self.disconnect(handle).await;
        }
        if !stale.is_empty() {
            info!(count = stale.len(), "Stale connections swept");
        }
        stale.len()
    }

    /// Graceful shutdown: notify every client, ask each socket to close,
    /// then wait up to `drain_timeout_seconds` for writers to flush.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutting_down.cancel();
        self.presence.shutdown();

        let notified = self.registry.broadcast(
            |_| true,
            &OutboundMessage::System {
                event: SystemEvent::ServerShutdown,
            },
        );
        self.registry.close_all();
        debug!(notified, "Shutdown notice sent");

        let drain = Duration::from_secs(self.config.drain_timeout_seconds);
        let drained = tokio::time::timeout(drain, async {
            while self.registry.connection_count() > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                remaining = self.registry.connection_count(),
                "Drain timeout elapsed, dropping remaining connections"
            );
            self.registry.clear();
        }
        info!("Real-time engine shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has started.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_cache::CacheManager;
    use sidechain_database::memory::{
        InMemoryActivityStore, InMemoryPreferenceStore, InMemorySocialGraph,
    };
    use sidechain_feed::providers::InMemoryFeedStore;

    fn engine_with(social: Arc<InMemorySocialGraph>) -> RealtimeEngine {
        RealtimeEngine::new(
            &AppConfig::default(),
            EngineDeps {
                social,
                activity: Arc::new(InMemoryActivityStore::new()),
                preferences: Arc::new(InMemoryPreferenceStore::new()),
                feed: Arc::new(InMemoryFeedStore::new()),
                cache: Arc::new(CacheManager::in_memory()),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_follows_connections_with_debounce() {
        let engine = engine_with(Arc::new(InMemorySocialGraph::new()));
        let user = Uuid::new_v4();

        let mut a = engine.connect(user, "u".into()).await.unwrap();
        assert_eq!(
            a.receiver.recv().await,
            Some(OutboundMessage::System {
                event: SystemEvent::Connected
            })
        );
        let b = engine.connect(user, "u".into()).await.unwrap();
        assert!(engine.presence.is_online(user));

        engine.disconnect(&a.handle).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(engine.presence.is_online(user));

        engine.disconnect(&b.handle).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(engine.presence.is_online(user));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!engine.presence.is_online(user));
        assert!(!engine.registry.is_online(&user));
    }

    #[tokio::test]
    async fn test_ping_gets_pong_with_client_time() {
        let engine = engine_with(Arc::new(InMemorySocialGraph::new()));
        let mut reg = engine.connect(Uuid::new_v4(), "u".into()).await.unwrap();
        let _connected = reg.receiver.recv().await;

        engine
            .handle_message(
                &reg.handle,
                InboundMessage::Ping {
                    client_time: Some(1234),
                },
            )
            .await
            .unwrap();
        match reg.receiver.recv().await {
            Some(OutboundMessage::Pong {
                client_time,
                server_time,
            }) => {
                assert_eq!(client_time, Some(1234));
                assert!(server_time > 0);
            }
            other => panic!("expected pong, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_typing_relayed_to_connected_followers_only() {
        let social = Arc::new(InMemorySocialGraph::new());
        let engine = engine_with(social.clone());
        let (typist, follower, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        social.follow(follower, typist);

        let typist_conn = engine.connect(typist, "t".into()).await.unwrap();
        let mut follower_conn = engine.connect(follower, "f".into()).await.unwrap();
        let mut stranger_conn = engine.connect(stranger, "s".into()).await.unwrap();
        // Drain connect notices and the typist's presence broadcast.
        while follower_conn.receiver.try_recv().is_ok() {}
        while stranger_conn.receiver.try_recv().is_ok() {}

        let post_id = Uuid::new_v4();
        engine
            .handle_message(&typist_conn.handle, InboundMessage::TypingStart { post_id })
            .await
            .unwrap();

        assert_eq!(
            follower_conn.receiver.try_recv().ok(),
            Some(OutboundMessage::UserTyping {
                user_id: typist,
                post_id
            })
        );
        assert!(stranger_conn.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_notifies_and_refuses_new_connections() {
        let engine = engine_with(Arc::new(InMemorySocialGraph::new()));
        let user = Uuid::new_v4();
        let mut reg = engine.connect(user, "u".into()).await.unwrap();
        let _connected = reg.receiver.recv().await;

        let writer = {
            let engine = engine.clone();
            let handle = reg.handle.clone();
            tokio::spawn(async move {
                handle.closed().await;
                let mut flushed = Vec::new();
                while let Ok(msg) = reg.receiver.try_recv() {
                    flushed.push(msg);
                }
                engine.disconnect(&handle).await;
                flushed
            })
        };

        engine.shutdown().await;
        let flushed = writer.await.unwrap();
        assert_eq!(
            flushed,
            vec![OutboundMessage::System {
                event: SystemEvent::ServerShutdown
            }]
        );
        assert_eq!(engine.registry.connection_count(), 0);
        assert!(engine.connect(user, "u".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_sweep_closes_stale_connections() {
        let engine = engine_with(Arc::new(InMemorySocialGraph::new()));
        let user = Uuid::new_v4();
        let reg = engine.connect(user, "u".into()).await.unwrap();
        reg.handle
            .set_last_ping(chrono::Utc::now() - chrono::Duration::seconds(301));

        assert_eq!(engine.sweep_stale().await, 1);
        assert!(reg.handle.is_closing());
        assert_eq!(engine.registry.connection_count(), 0);
    }
}
