//! `AuthUser` extractor: pulls the JWT from the Authorization header and
//! validates it.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use uuid::Uuid;

use sidechain_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller of a REST route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

/// The token of an `Authorization: Bearer ...` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::authentication("Missing bearer token"))?;
        let claims = state.jwt_decoder.decode_access_token(&token).await?;

        Ok(AuthUser {
            user_id: claims.user_id(),
            username: claims.username,
        })
    }
}

/// Caller of the internal event ingress route. Requires `X-Internal-Token`
/// to match `server.internal_token` when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct InternalCaller;

impl FromRequestParts<AppState> for InternalCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.server.internal_token.as_str();
        if expected.is_empty() {
            return Ok(InternalCaller);
        }
        let presented = parts
            .headers
            .get("x-internal-token")
            .and_then(|v| v.to_str().ok());
        if presented == Some(expected) {
            Ok(InternalCaller)
        } else {
            Err(AppError::authentication("Invalid internal token").into())
        }
    }
}
