use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kotoba_core::model::UserId;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User UUID.
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token subject is not a user id")]
    InvalidSubject,
}

/// Verifies HS256 tokens minted by the identity provider with a shared secret.
pub struct JwtService {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::ExpiredToken`, `InvalidSignature` or `InvalidToken`.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken,
            })
    }

    /// Validate `token` and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Any `validate_token` error, or `AuthError::InvalidSubject` when `sub`
    /// is not a UUID.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.validate_token(token)?;
        claims.sub.parse().map_err(|_| AuthError::InvalidSubject)
    }
}

/// The authenticated caller, taken from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let user = state.jwt.authenticate(token).inspect_err(|err| {
            tracing::warn!("JWT validation failed: {err}");
        })?;
        tracing::debug!(%user, "authenticated request");
        Ok(CurrentUser(user))
    }
}

// ─── TESTS ──────────────────────────────────────────────────────────────────────
