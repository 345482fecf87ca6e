//! Activity-status settings handlers.

use axum::Json;
use axum::extract::State;

use sidechain_core::types::ActivitySettings;

use crate::dto::{ApiResponse, UpdateActivityStatusRequest};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/settings/activity-status
pub async fn get_activity_status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ActivitySettings>>> {
    let settings = state.activity_status.get(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// PUT /api/v1/settings/activity-status
pub async fn update_activity_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateActivityStatusRequest>,
) -> ApiResult<Json<ApiResponse<ActivitySettings>>> {
    let settings = state
        .activity_status
        .update(auth.user_id, req.show_activity_status, req.show_last_active)
        .await?;
    Ok(Json(ApiResponse::ok(settings)))
}
