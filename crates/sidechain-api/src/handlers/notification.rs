//! Notification and preference handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};

use sidechain_core::types::NotificationPreferences;
use sidechain_entity::notification::{NotificationCounts, NotificationPage};

use crate::dto::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<NotificationPage>>> {
    let page = state
        .notifications
        .list(auth.user_id, params.into_page_request()?)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/v1/notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<NotificationCounts>>> {
    let counts = state.notifications.mark_read(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(counts)))
}

/// POST /api/v1/notifications/seen
pub async fn mark_seen(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<NotificationCounts>>> {
    let counts = state.notifications.mark_seen(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(counts)))
}

/// GET /api/v1/notifications/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<NotificationPreferences>>> {
    let prefs = state.preferences.get(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(prefs)))
}

/// PUT /api/v1/notifications/preferences
///
/// Body is a partial `{category: bool}` map.
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(changes): Json<HashMap<String, bool>>,
) -> ApiResult<Json<ApiResponse<NotificationPreferences>>> {
    let prefs = state.preferences.update(auth.user_id, changes).await?;
    Ok(Json(ApiResponse::ok(prefs)))
}
