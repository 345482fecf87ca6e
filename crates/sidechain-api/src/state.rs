//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use sidechain_auth::JwtDecoder;
use sidechain_core::config::AppConfig;
use sidechain_cache::CacheManager;
use sidechain_core::traits::{FeedStore, SearchIndex};
use sidechain_database::DatabasePool;
use sidechain_realtime::RealtimeEngine;
use sidechain_service::{ActivityStatusService, NotificationService, PreferenceService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when running on in-memory stores
    pub db: Option<DatabasePool>,
    /// Cache (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Durable notification feed
    pub feed: Arc<dyn FeedStore>,
    /// Search index
    pub search: Arc<dyn SearchIndex>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Realtime ─────────────────────────────────────────────
    /// WebSocket realtime engine
    pub engine: RealtimeEngine,

    // ── Services ─────────────────────────────────────────────
    /// Notification listing and read state
    pub notifications: Arc<NotificationService>,
    /// Notification preferences
    pub preferences: Arc<PreferenceService>,
    /// Activity-status visibility
    pub activity_status: Arc<ActivityStatusService>,
}
