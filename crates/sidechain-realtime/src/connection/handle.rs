//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::message::types::OutboundMessage;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Result of offering one message to a connection's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the socket writer.
    Accepted,
    /// Queue full; the message was dropped for this connection.
    Dropped,
    /// The writer is gone; the connection is dead.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender side of the bounded outbound queue plus metadata about
/// the connected user. The socket task owns the receiver.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: Uuid,
    /// Username (cached for logging)
    pub username: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    /// Last ping/heartbeat/pong, in milliseconds since the epoch
    last_ping_ms: AtomicI64,
    alive: AtomicBool,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: Uuid, username: String, sender: mpsc::Sender<OutboundMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            username,
            connected_at: now,
            sender,
            last_ping_ms: AtomicI64::new(now.timestamp_millis()),
            alive: AtomicBool::new(true),
            closed: CancellationToken::new(),
        }
    }

    /// Offer a message without waiting. A full queue drops the new message.
    pub fn try_deliver(&self, msg: OutboundMessage) -> Delivery {
        if !self.is_alive() {
            return Delivery::Closed;
        }
        match self.sender.try_send(msg) {
            Ok(()) => Delivery::Accepted,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, user_id = %self.user_id, "Send buffer full, dropping message");
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Delivery::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Ask the socket task to flush and close. Idempotent.
    pub fn close(&self) {
        self.mark_dead();
        self.closed.cancel();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// Whether a close was requested.
    pub fn is_closing(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Refresh the liveness timestamp
    pub fn touch(&self) {
        self.last_ping_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// Last ping/heartbeat/pong time
    pub fn last_ping(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_ping_ms.load(Ordering::SeqCst))
            .unwrap_or(self.connected_at)
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.user_id,
            username: self.username.clone(),
            connected_at: self.connected_at,
            last_ping: self.last_ping(),
            alive: self.is_alive(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_last_ping(&self, at: DateTime<Utc>) {
        self.last_ping_ms
            .store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// User ID
    pub user_id: Uuid,
    /// Username
    pub username: String,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Last ping
    pub last_ping: DateTime<Utc>,
    /// Is alive
    pub alive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pong() -> OutboundMessage {
        OutboundMessage::Pong {
            client_time: None,
            server_time: 0,
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(Uuid::new_v4(), "a".into(), tx);

        assert_eq!(handle.try_deliver(pong()), Delivery::Accepted);
        assert_eq!(handle.try_deliver(pong()), Delivery::Dropped);
        assert!(handle.is_alive());
        assert!(rx.recv().await.is_some());
        assert_eq!(handle.try_deliver(pong()), Delivery::Accepted);
    }

    #[tokio::test]
    async fn test_dropped_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Uuid::new_v4(), "a".into(), tx);
        drop(rx);

        assert_eq!(handle.try_deliver(pong()), Delivery::Closed);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let (tx, _rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Uuid::new_v4(), "a".into(), tx);
        handle.close();
        handle.closed().await;
        assert!(handle.is_closing());
        assert_eq!(handle.try_deliver(pong()), Delivery::Closed);
    }
}
