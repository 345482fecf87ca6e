//! WebSocket auxiliary handlers: online checks and counters.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use sidechain_core::error::AppError;

use crate::dto::{ApiResponse, BulkPresenceRequest, OnlineStatusResponse, RealtimeMetricsResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/v1/ws/online
///
/// Users hiding their activity status always read as offline.
pub async fn online_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkPresenceRequest>,
) -> ApiResult<Json<ApiResponse<OnlineStatusResponse>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let statuses = state
        .engine
        .presence
        .presence_many(auth.user_id, &req.user_ids)
        .await?
        .into_iter()
        .map(|view| (view.user_id, view.is_online))
        .collect();
    Ok(Json(ApiResponse::ok(OnlineStatusResponse { statuses })))
}

/// GET /api/v1/ws/metrics
pub async fn metrics(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<RealtimeMetricsResponse>> {
    Json(ApiResponse::ok(RealtimeMetricsResponse {
        websocket: state.engine.registry.metrics(),
        timestamp: chrono::Utc::now(),
    }))
}
