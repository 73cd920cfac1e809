//! JWT authentication module.
//!
//! Handles token generation and validation, plus the axum extractors that
//! turn an `Authorization: Bearer <token>` header into an identity.
//!
//! ## Token Types
//! ```text
//! ┌──────────────┬────────────────┬──────────────────────────────────────┐
//! │ token_type   │ default life   │ accepted by                          │
//! ├──────────────┼────────────────┼──────────────────────────────────────┤
//! │ access       │ 1 hour         │ every authenticated route, /ws       │
//! │ refresh      │ 7 days         │ POST /api/v1/refresh-token only      │
//! └──────────────┴────────────────┴──────────────────────────────────────┘
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use knet_core::{Role, User};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Which kind of credential a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role at issuance. Authorization always re-reads the stored role.
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    pub token_type: TokenType,
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> ApiResult<i64> {
        self.sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid token subject"))
    }
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    /// Generate an access token.
    pub fn generate_access_token(&self, user_id: i64, role: Role) -> ApiResult<String> {
        self.generate(user_id, role, TokenType::Access, self.access_lifetime_secs)
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self, user_id: i64, role: Role) -> ApiResult<String> {
        self.generate(user_id, role, TokenType::Refresh, self.refresh_lifetime_secs)
    }

    fn generate(
        &self,
        user_id: i64,
        role: Role,
        token_type: TokenType,
        lifetime_secs: i64,
    ) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate signature and expiry, and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::unauthorized("Invalid or expired token")
            })?;

        Ok(data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> ApiResult<Claims> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> ApiResult<Claims> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> ApiResult<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            return Err(ApiError::unauthorized(match expected {
                TokenType::Access => "Expected access token",
                TokenType::Refresh => "Expected refresh token",
            }));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn bearer_from_parts(parts: &Parts) -> ApiResult<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))
}

// =============================================================================
// Extractors
// =============================================================================

/// Claims of a valid access token, without touching the database.
#[derive(Debug, Clone)]
pub struct AccessClaims(pub Claims);

impl FromRequestParts<AppState> for AccessClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_from_parts(parts)?;
        state.jwt.validate_access_token(token).map(AccessClaims)
    }
}

/// Claims of a valid refresh token.
#[derive(Debug, Clone)]
pub struct RefreshClaims(pub Claims);

impl FromRequestParts<AppState> for RefreshClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_from_parts(parts)?;
        state.jwt.validate_refresh_token(token).map(RefreshClaims)
    }
}

/// The account behind a valid access token, re-loaded on every request so
/// role changes and deletions apply immediately.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Fails with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Unauthorized access"))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AccessClaims(claims) = AccessClaims::from_request_parts(parts, state).await?;
        let user_id = claims.user_id()?;

        let user = state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        Ok(AuthUser(user))
    }
}
