//! Health check handler.

use axum::Json;
use axum::extract::State;

use sidechain_core::result::AppResult;
use sidechain_core::traits::CacheProvider;

use crate::dto::{ApiResponse, ComponentHealth, HealthResponse};
use crate::state::AppState;

fn component(name: &str, result: AppResult<bool>) -> ComponentHealth {
    match result {
        Ok(healthy) => ComponentHealth {
            name: name.to_string(),
            healthy,
            error: None,
        },
        Err(e) => ComponentHealth {
            name: name.to_string(),
            healthy: false,
            error: Some(e.message),
        },
    }
}

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let mut components = vec![
        component("cache", state.cache.health_check().await),
        component("feed", state.feed.health_check().await),
        component("search", state.search.health_check().await),
    ];
    if let Some(db) = &state.db {
        components.push(component("database", db.health_check().await));
    }

    let status = if components.iter().all(|c| c.healthy) {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ws_connections: state.engine.registry.connection_count(),
        online_users: state.engine.registry.online_users().len(),
        components,
    }))
}
