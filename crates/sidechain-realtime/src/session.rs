//! Per-socket inbound message handling.

use std::sync::Arc;

use tracing::debug;

use crate::connection::handle::ConnectionHandle;
use crate::connection::rate_limit::TokenBucket;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::validate_inbound;
use crate::server::RealtimeEngine;

/// State owned by one socket's reader loop.
#[derive(Debug)]
pub struct ClientSession {
    engine: RealtimeEngine,
    handle: Arc<ConnectionHandle>,
    limiter: TokenBucket,
}

impl ClientSession {
    /// Creates a session for `handle` with a fresh rate-limit bucket.
    pub fn new(engine: RealtimeEngine, handle: Arc<ConnectionHandle>) -> Self {
        let config = engine.config();
        let limiter = TokenBucket::new(config.rate_limit_per_second, config.rate_limit_burst);
        Self {
            engine,
            handle,
            limiter,
        }
    }

    /// The connection this session reads for.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Handle one text frame. Problems are reported back to the client as
    /// `error` messages; the socket stays open.
    pub async fn on_text(&mut self, raw: &str) {
        self.handle.touch();

        if !self.limiter.try_acquire() {
            self.reply_error("rate_limited", "Too many messages");
            return;
        }

        if let Err(e) = validate_inbound(raw, self.engine.config().max_message_size) {
            self.reply_error("invalid_message", e.message);
            return;
        }

        let message = match InboundMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                debug!(conn_id = %self.handle.id, error = %e, "Unparseable client message");
                self.reply_error("invalid_message", e.message);
                return;
            }
        };

        if let Err(e) = self.engine.handle_message(&self.handle, message).await {
            self.handle.try_deliver(OutboundMessage::from_error(&e));
        }
    }

    /// A protocol-level pong or any other control frame.
    pub fn on_pong(&self) {
        self.handle.touch();
        self.engine.presence.heartbeat(self.handle.user_id);
    }

    /// Remove the connection once the reader loop ends.
    pub async fn close(self) {
        self.engine.disconnect(&self.handle).await;
    }

    fn reply_error(&self, code: &str, message: impl Into<String>) {
        self.handle
            .try_deliver(OutboundMessage::error(code, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_cache::CacheManager;
    use sidechain_core::config::AppConfig;
    use sidechain_core::types::PresenceStatus;
    use sidechain_database::memory::{
        InMemoryActivityStore, InMemoryPreferenceStore, InMemorySocialGraph,
    };
    use sidechain_feed::providers::InMemoryFeedStore;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::server::EngineDeps;

    fn engine(config: AppConfig) -> RealtimeEngine {
        RealtimeEngine::new(
            &config,
            EngineDeps {
                social: Arc::new(InMemorySocialGraph::new()),
                activity: Arc::new(InMemoryActivityStore::new()),
                preferences: Arc::new(InMemoryPreferenceStore::new()),
                feed: Arc::new(InMemoryFeedStore::new()),
                cache: Arc::new(CacheManager::in_memory()),
            },
        )
    }

    async fn session(
        config: AppConfig,
    ) -> (ClientSession, mpsc::Receiver<OutboundMessage>) {
        let engine = engine(config);
        let mut reg = engine.connect(Uuid::new_v4(), "u".into()).await.unwrap();
        let _connected = reg.receiver.recv().await;
        (ClientSession::new(engine, reg.handle), reg.receiver)
    }

    fn error_code(msg: Option<OutboundMessage>) -> String {
        match msg {
            Some(OutboundMessage::Error { code, .. }) => code,
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_gets_error_and_session_continues() {
        let (mut session, mut rx) = session(AppConfig::default()).await;

        session.on_text("{not json").await;
        assert_eq!(error_code(rx.recv().await), "invalid_message");

        session.on_text(r#"{"type":"teleport"}"#).await;
        assert_eq!(error_code(rx.recv().await), "invalid_message");

        session.on_text(r#"{"type":"ping","payload":{"client_time":7}}"#).await;
        assert!(matches!(
            rx.recv().await,
            Some(OutboundMessage::Pong {
                client_time: Some(7),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut config = AppConfig::default();
        config.realtime.max_message_size = 32;
        let (mut session, mut rx) = session(config).await;

        let raw = format!(r#"{{"type":"ping","payload":{{"pad":"{}"}}}}"#, "x".repeat(64));
        session.on_text(&raw).await;
        assert_eq!(error_code(rx.recv().await), "invalid_message");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_replies_with_error() {
        let mut config = AppConfig::default();
        config.realtime.rate_limit_per_second = 1;
        config.realtime.rate_limit_burst = 2;
        let (mut session, mut rx) = session(config).await;

        for _ in 0..3 {
            session.on_text(r#"{"type":"heartbeat"}"#).await;
        }
        assert_eq!(error_code(rx.recv().await), "rate_limited");
    }

    #[tokio::test]
    async fn test_presence_update_errors_are_reported() {
        let (mut session, mut rx) = session(AppConfig::default()).await;

        session
            .on_text(r#"{"type":"presence_update","payload":{"status":"offline"}}"#)
            .await;
        assert_eq!(error_code(rx.recv().await), "validation");

        session
            .on_text(r#"{"type":"presence_update","payload":{"status":"away"}}"#)
            .await;
        assert_eq!(error_code(rx.recv().await), "invalid_message");

        session
            .on_text(r#"{"type":"presence_update","payload":{"status":"in_studio","custom_status":"mixing","daw":"Ableton Live"}}"#)
            .await;
        let state = session.engine.presence.state(session.handle.user_id);
        assert_eq!(state.status, PresenceStatus::InStudio);
        assert_eq!(state.custom_status.as_deref(), Some("mixing"));
        assert_eq!(state.daw.as_deref(), Some("Ableton Live"));
    }

    #[tokio::test]
    async fn test_close_unregisters_connection() {
        let (session, _rx) = session(AppConfig::default()).await;
        let engine = session.engine.clone();
        assert_eq!(engine.registry.connection_count(), 1);
        session.close().await;
        assert_eq!(engine.registry.connection_count(), 0);
    }
}
