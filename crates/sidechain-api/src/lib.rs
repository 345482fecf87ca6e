//! # sidechain-api
//!
//! HTTP API layer for Sidechain built on Axum.
//!
//! Provides the notification, preference, activity-status, presence and
//! event-ingress REST routes, the WebSocket upgrade, middleware (CORS,
//! compression, logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Backends, build_app, build_state, run_server};
pub use error::{ApiError, ApiResult};
pub use middleware::logging::init_logging;
pub use state::AppState;
