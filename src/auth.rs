//! JWT authentication and password hashing.
//!
//! Access tokens are short-lived HS256 JWTs carrying the username, user id
//! and role; refresh tokens reuse the same claim shape with a longer expiry
//! and a `type` discriminator so one cannot stand in for the other.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiError;
use crate::config::AuthConfig;
use crate::domain::{TokenPair, User, UserRole};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub user_id: String,
    pub role: UserRole,
    /// Expiry as Unix seconds
    pub exp: usize,
    #[serde(rename = "type")]
    pub token_type: TokenKind,
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn encode_token(user: &User, kind: TokenKind, exp: usize, cfg: &AuthConfig) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id.clone(),
        role: user.role,
        exp,
        token_type: kind,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret_key.as_bytes()),
    )?)
}

/// Issue a fresh access + refresh token pair for a user.
pub fn issue_token_pair(user: &User, cfg: &AuthConfig) -> anyhow::Result<TokenPair> {
    let access_exp = (Utc::now() + chrono::Duration::minutes(cfg.access_token_ttl_minutes))
        .timestamp() as usize;
    let refresh_exp =
        (Utc::now() + chrono::Duration::days(cfg.refresh_token_ttl_days)).timestamp() as usize;

    Ok(TokenPair {
        access_token: encode_token(user, TokenKind::Access, access_exp, cfg)?,
        refresh_token: encode_token(user, TokenKind::Refresh, refresh_exp, cfg)?,
        token_type: "bearer".to_string(),
    })
}

pub fn decode_token(token: &str, cfg: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret_key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Decode and check an access token; refresh tokens are rejected here.
pub fn verify_access_token(token: &str, cfg: &AuthConfig) -> Result<Claims, ApiError> {
    let claims = decode_token(token, cfg).map_err(|e| {
        debug!(error = %e, "token validation failed");
        ApiError::Unauthorized
    })?;
    if claims.token_type != TokenKind::Access {
        return Err(ApiError::Unauthorized);
    }
    Ok(claims)
}

/// Authenticated caller, resolved against the user store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let claims = verify_access_token(bearer.token(), &state.cfg.auth)?;

        let record = state
            .store
            .find_user(&claims.sub)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .ok_or(ApiError::Unauthorized)?;

        if !record.user.is_active {
            return Err(ApiError::Unauthorized);
        }

        Ok(Self(record.user))
    }
}

/// Caller with operator or admin role.
#[derive(Debug, Clone)]
pub struct OperatorUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for OperatorUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_operator() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Caller with admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(user))
    }
}
