//! Presence handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use sidechain_core::error::AppError;
use sidechain_entity::presence::PresenceView;
use sidechain_realtime::StatusChange;

use crate::dto::{
    ApiResponse, BulkPresenceRequest, BulkPresenceResponse, FriendsInStudioResponse,
    UpdatePresenceRequest,
};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/{id}/presence
///
/// Hidden fields are masked according to the subject's visibility
/// settings unless the caller is the subject.
pub async fn get_presence(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<PresenceView>>> {
    let view = state
        .engine
        .presence
        .presence_for(auth.user_id, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PUT /api/v1/presence/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdatePresenceRequest>,
) -> ApiResult<Json<ApiResponse<PresenceView>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    state
        .engine
        .presence
        .update_status(
            auth.user_id,
            StatusChange {
                status: req.status,
                custom_status: req.custom_status.as_deref(),
                daw: req.daw.as_deref(),
            },
        )
        .await?;
    let view = state
        .engine
        .presence
        .presence_for(auth.user_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/v1/presence/bulk
///
/// Visibility is applied to each subject separately.
pub async fn bulk_presence(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkPresenceRequest>,
) -> ApiResult<Json<ApiResponse<BulkPresenceResponse>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let presence = state
        .engine
        .presence
        .presence_many(auth.user_id, &req.user_ids)
        .await?;
    let online_count = presence.iter().filter(|v| v.is_online).count();
    Ok(Json(ApiResponse::ok(BulkPresenceResponse {
        presence,
        online_count,
    })))
}

/// GET /api/v1/presence/friends-in-studio
pub async fn friends_in_studio(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FriendsInStudioResponse>>> {
    let friends = state.engine.presence.friends_in_studio(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(FriendsInStudioResponse {
        count: friends.len(),
        friends,
    })))
}
