//! # sidechain-realtime
//!
//! Real-time WebSocket engine for Sidechain. Provides:
//!
//! - Connection registry with bounded per-connection queues
//! - Presence tracking with a debounced offline transition
//! - Notification preference gate backed by a short-lived cache
//! - Event fan-out to live sockets with feed fallback

pub mod connection;
pub mod message;
pub mod preferences;
pub mod presence;
pub mod router;
pub mod server;
pub mod session;

pub use connection::registry::{ConnectionRegistry, RegistryMetrics};
pub use message::types::{InboundMessage, OutboundMessage};
pub use preferences::PreferenceGate;
pub use presence::tracker::{PresenceTracker, StatusChange};
pub use router::{DispatchReport, FanoutRouter};
pub use server::{EngineDeps, RealtimeEngine};
pub use session::ClientSession;
