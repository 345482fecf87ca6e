//! JWT token validation and blocklist checking.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use sidechain_cache::provider::CacheManager;
use sidechain_core::config::AuthConfig;
use sidechain_core::error::AppError;
use sidechain_core::traits::CacheProvider;

use super::claims::{Claims, TokenType};

/// Cache key prefix for blocklisted JWT IDs.
const BLOCKLIST_PREFIX: &str = "jwt:blocklist:";

/// Validates JWT tokens and checks blocklist status.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Cache manager for blocklist lookups.
    cache: Arc<CacheManager>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        if !config.issuer.is_empty() {
            validation.set_issuer(&[config.issuer.as_str()]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cache,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks signature, expiration, token type and the revocation
    /// blocklist, in that order.
    pub async fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::authentication("Invalid token issuer")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;
        let claims = token_data.claims;

        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication(
                "Invalid token type: expected access token",
            ));
        }

        self.check_blocklist(&claims.jti).await?;

        Ok(claims)
    }

    /// Checks whether the given JWT ID has been blocklisted.
    ///
    /// A cache outage does not lock everyone out; the token is accepted.
    async fn check_blocklist(&self, jti: &Uuid) -> Result<(), AppError> {
        let key = format!("{BLOCKLIST_PREFIX}{jti}");
        match self.cache.exists(&key).await {
            Ok(true) => Err(AppError::authentication("Token has been revoked")),
            Ok(false) => Ok(()),
            Err(e) => {
                warn!(jti = %jti, error = %e, "Blocklist lookup failed, accepting token");
                Ok(())
            }
        }
    }

    /// Adds a JWT ID to the blocklist with the remaining TTL.
    pub async fn blocklist_token(
        &self,
        jti: Uuid,
        remaining_ttl_seconds: u64,
    ) -> Result<(), AppError> {
        let key = format!("{BLOCKLIST_PREFIX}{jti}");
        let ttl = Duration::from_secs(remaining_ttl_seconds.max(60));
        self.cache.set(&key, "revoked", ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use sidechain_core::error::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        }
    }

    fn decoder(config: &AuthConfig) -> JwtDecoder {
        JwtDecoder::new(config, Arc::new(CacheManager::in_memory()))
    }

    #[tokio::test]
    async fn test_issued_token_decodes_to_same_user() {
        let config = config();
        let user = Uuid::new_v4();
        let token = JwtEncoder::new(&config)
            .generate_access_token(user, "beatsmith")
            .unwrap();

        let claims = decoder(&config).decode_access_token(&token).await.unwrap();
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.username, "beatsmith");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let token = JwtEncoder::new(&config())
            .generate_access_token(Uuid::new_v4(), "x")
            .unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..AuthConfig::default()
        };

        let err = decoder(&other).decode_access_token(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let config = config();
        let token = JwtEncoder::new(&config)
            .generate(Uuid::new_v4(), "x", TokenType::Refresh)
            .unwrap();

        let err = decoder(&config).decode_access_token(&token).await.unwrap_err();
        assert!(err.message.contains("token type"));
    }

    #[tokio::test]
    async fn test_blocklisted_token_is_rejected() {
        let config = config();
        let token = JwtEncoder::new(&config)
            .generate_access_token(Uuid::new_v4(), "x")
            .unwrap();
        let decoder = decoder(&config);
        let claims = decoder.decode_access_token(&token).await.unwrap();

        decoder.blocklist_token(claims.jti, 600).await.unwrap();
        let err = decoder.decode_access_token(&token).await.unwrap_err();
        assert!(err.message.contains("revoked"));
    }

    #[tokio::test]
    async fn test_issuer_mismatch_is_rejected() {
        let issuing = AuthConfig {
            issuer: "someone-else".into(),
            ..config()
        };
        let verifying = AuthConfig {
            issuer: "sidechain".into(),
            ..config()
        };
        let token = JwtEncoder::new(&issuing)
            .generate_access_token(Uuid::new_v4(), "x")
            .unwrap();

        assert!(decoder(&verifying).decode_access_token(&token).await.is_err());
    }
}
