//! Connection registry: every live socket, indexed by user and by ID.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sidechain_core::config::RealtimeConfig;

use crate::message::types::OutboundMessage;

use super::handle::{ConnectionHandle, ConnectionId, Delivery};

/// Outcome of [`ConnectionRegistry::register`].
#[derive(Debug)]
pub struct Registration {
    /// The new connection.
    pub handle: Arc<ConnectionHandle>,
    /// Receiver the socket writer drains.
    pub receiver: mpsc::Receiver<OutboundMessage>,
    /// Whether the user had no other connection.
    pub first_for_user: bool,
    /// Oldest connection closed to stay within the per-user limit.
    pub evicted: Option<Arc<ConnectionHandle>>,
}

/// Point-in-time counters of the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetrics {
    /// Connections registered since start.
    pub total_connections: u64,
    /// Connections registered right now.
    pub active_connections: u64,
    /// Users with at least one connection.
    pub online_users: u64,
    /// Messages accepted by a connection queue.
    pub messages_sent: u64,
    /// Messages dropped on a full queue.
    pub messages_dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    total_connections: AtomicU64,
    messages_sent: AtomicU64,
    messages_dropped: AtomicU64,
}

/// Thread-safe registry of all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// User ID → connections, oldest first.
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    counters: Counters,
    config: RealtimeConfig,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            by_user: DashMap::new(),
            by_id: DashMap::new(),
            counters: Counters::default(),
            config,
        }
    }

    /// Registers an authenticated connection for `user_id`.
    ///
    /// When the user is already at `max_connections_per_user`, the oldest
    /// connection is closed and removed.
    pub fn register(&self, user_id: Uuid, username: String) -> Registration {
        let (tx, receiver) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, username, tx));

        let (first_for_user, evicted) = {
            let mut connections = self.by_user.entry(user_id).or_default();
            let first = connections.is_empty();
            let evicted = if connections.len() >= self.config.max_connections_per_user.max(1) {
                Some(connections.remove(0))
            } else {
                None
            };
            connections.push(handle.clone());
            (first, evicted)
        };

        if let Some(oldest) = &evicted {
            warn!(
                user_id = %user_id,
                conn_id = %oldest.id,
                max = self.config.max_connections_per_user,
                "User at max connections, closing oldest"
            );
            oldest.close();
            self.by_id.remove(&oldest.id);
        }
        self.by_id.insert(handle.id, handle.clone());
        self.counters.total_connections.fetch_add(1, Ordering::Relaxed);

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            first_for_user,
            "WebSocket connection registered"
        );

        Registration {
            handle,
            receiver,
            first_for_user,
            evicted,
        }
    }

    /// Removes a connection. Returns the handle and whether it was the
    /// user's last connection, or `None` if it was already gone.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<(Arc<ConnectionHandle>, bool)> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        handle.mark_dead();

        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
        }
        let last = self
            .by_user
            .remove_if(&handle.user_id, |_, connections| connections.is_empty())
            .is_some();

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            last_for_user = last,
            "WebSocket connection unregistered"
        );
        Some((handle, last))
    }

    /// Offers `message` to every live connection of `user_id` without
    /// blocking. Returns how many connections accepted it.
    pub fn send(&self, user_id: Uuid, message: &OutboundMessage) -> usize {
        let connections = self.user_connections(&user_id);
        let mut delivered = 0;
        for conn in &connections {
            match conn.try_deliver(message.clone()) {
                Delivery::Accepted => delivered += 1,
                Delivery::Dropped => {
                    self.counters.messages_dropped.fetch_add(1, Ordering::Relaxed);
                }
                Delivery::Closed => {
                    debug!(conn_id = %conn.id, "Connection closed during send, removing");
                    self.unregister(&conn.id);
                }
            }
        }
        self.counters
            .messages_sent
            .fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Offers `message` to every connection whose user satisfies
    /// `predicate`. Returns how many connections accepted it.
    pub fn broadcast<F>(&self, predicate: F, message: &OutboundMessage) -> usize
    where
        F: Fn(Uuid) -> bool,
    {
        let targets: Vec<Uuid> = self
            .by_user
            .iter()
            .map(|entry| *entry.key())
            .filter(|user_id| predicate(*user_id))
            .collect();
        targets
            .into_iter()
            .map(|user_id| self.send(user_id, message))
            .sum()
    }

    /// Whether the user holds at least one live connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.by_user
            .get(user_id)
            .is_some_and(|connections| connections.iter().any(|c| c.is_alive()))
    }

    /// Gets all connections for a user.
    pub fn user_connections(&self, user_id: &Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Refresh a connection's liveness timestamp.
    pub fn touch(&self, conn_id: &ConnectionId) -> bool {
        match self.by_id.get(conn_id) {
            Some(handle) => {
                handle.touch();
                true
            }
            None => false,
        }
    }

    /// Connections with no ping for longer than `timeout`.
    pub fn stale_connections(&self, timeout: std::time::Duration) -> Vec<Arc<ConnectionHandle>> {
        let Some(cutoff) = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|timeout| Utc::now().checked_sub_signed(timeout))
        else {
            return Vec::new();
        };
        self.by_id
            .iter()
            .filter(|entry| entry.value().last_ping() < cutoff)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Snapshot of the connection and message counters.
    pub fn metrics(&self) -> RegistryMetrics {
        RegistryMetrics {
            total_connections: self.counters.total_connections.load(Ordering::Relaxed),
            active_connections: self.by_id.len() as u64,
            online_users: self.by_user.len() as u64,
            messages_sent: self.counters.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.counters.messages_dropped.load(Ordering::Relaxed),
        }
    }

    /// Returns all connected user IDs.
    pub fn online_users(&self) -> Vec<Uuid> {
        self.by_user.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Ask every connection to close. Handles stay registered until their
    /// socket task unregisters them.
    pub fn close_all(&self) -> usize {
        let all = self.all_connections();
        for conn in &all {
            conn.close();
        }
        info!(count = all.len(), "All connections asked to close");
        all.len()
    }

    /// Drop every remaining entry.
    pub fn clear(&self) {
        self.by_id.clear();
        self.by_user.clear();
    }
}
