//! Domain-event ingress used by the CRUD services.

use axum::Json;
use axum::extract::State;
use tracing::debug;

use sidechain_core::events::DomainEvent;
use sidechain_realtime::DispatchReport;

use crate::dto::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::InternalCaller;
use crate::state::AppState;

/// POST /api/v1/events
///
/// Fans the event out and reports what happened per recipient. Delivery
/// failures never fail the request.
pub async fn ingest_event(
    State(state): State<AppState>,
    _caller: InternalCaller,
    Json(event): Json<DomainEvent>,
) -> ApiResult<Json<ApiResponse<DispatchReport>>> {
    debug!(event_id = %event.id, category = %event.category(), "Event received");
    let report = state.engine.router.dispatch(&event).await;
    Ok(Json(ApiResponse::ok(report)))
}
