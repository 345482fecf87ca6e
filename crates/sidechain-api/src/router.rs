//! Route definitions for the Sidechain HTTP API.
//!
//! REST routes are mounted under `/api/v1`; the WebSocket upgrade lives at
//! `/ws`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(settings_routes())
        .merge(presence_routes())
        .merge(realtime_routes())
        .merge(event_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(DefaultBodyLimit::max(state.config.server.body_limit_bytes))
        .layer(middleware::compression::build_compression_layer())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Notification listing, read state and preferences
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/read",
            post(handlers::notification::mark_read),
        )
        .route(
            "/notifications/seen",
            post(handlers::notification::mark_seen),
        )
        .route(
            "/notifications/preferences",
            get(handlers::notification::get_preferences)
                .put(handlers::notification::update_preferences),
        )
}

fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/settings/activity-status",
        get(handlers::settings::get_activity_status)
            .put(handlers::settings::update_activity_status),
    )
}

fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/presence", get(handlers::presence::get_presence))
        .route("/presence/status", put(handlers::presence::update_status))
        .route("/presence/bulk", post(handlers::presence::bulk_presence))
        .route(
            "/presence/friends-in-studio",
            get(handlers::presence::friends_in_studio),
        )
}

/// Online checks and counters next to the `/ws` upgrade
fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/online", post(handlers::realtime::online_status))
        .route("/ws/metrics", get(handlers::realtime::metrics))
}

/// Internal domain-event ingress
fn event_routes() -> Router<AppState> {
    Router::new().route("/events", post(handlers::events::ingest_event))
}
