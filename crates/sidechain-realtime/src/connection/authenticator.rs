//! WebSocket authentication: validates the bearer JWT before upgrade.

use std::sync::Arc;

use uuid::Uuid;

use sidechain_auth::jwt::JwtDecoder;
use sidechain_core::error::AppError;

/// Authenticated connection info extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedConnection {
    /// User ID.
    pub user_id: Uuid,
    /// Username.
    pub username: String,
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection using a JWT from the `token` query
    /// parameter or the `Authorization` header.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedConnection, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing access token"))?;
        let claims = self.decoder.decode_access_token(token).await?;

        Ok(AuthenticatedConnection {
            user_id: claims.user_id(),
            username: claims.username,
        })
    }
}
