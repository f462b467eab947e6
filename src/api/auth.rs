//! Authentication endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use super::response::ApiResponse;
use crate::auth::{hash_password, issue_token_pair, verify_password, CurrentUser};
use crate::config::Environment;
use crate::domain::{
    LoginRequest, PasswordReset, PasswordResetRequest, TokenPair, User, UserCreate, UserRecord,
};
use crate::state::AppState;
use crate::store::seed::ensure_demo_users;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/demo/create-demo-users", post(create_demo_users))
        .route("/password-reset-request", post(password_reset_request))
        .route("/password-reset", post(password_reset))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    req.validate()?;

    if state
        .store
        .find_user(&req.username)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .is_some()
        || state
            .store
            .find_user_by_email(&req.email)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .is_some()
    {
        return Err(ApiError::BadRequest(
            "Username or email already registered".to_string(),
        ));
    }

    let user = User {
        id: format!("user_{}", Utc::now().timestamp()),
        username: req.username.clone(),
        email: req.email,
        full_name: req.full_name,
        role: req.role,
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
    };

    let record = UserRecord {
        hashed_password: hash_password(&req.password)
            .map_err(|e| ApiError::InternalError(e.to_string()))?,
        user: user.clone(),
    };

    state
        .store
        .insert_user(record)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(username = %user.username, "new user registered");

    Ok(ApiResponse::success(
        "User registered successfully",
        json!({
            "user_id": user.id,
            "username": user.username,
            "role": user.role,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let record = state
        .store
        .find_user(&req.username)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&req.password, &record.hashed_password) {
        return Err(ApiError::Unauthorized);
    }

    let tokens = issue_token_pair(&record.user, &state.cfg.auth)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    state
        .store
        .touch_last_login(&record.user.username, Utc::now())
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(username = %record.user.username, "user logged in");
    Ok(Json(tokens))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn refresh(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TokenPair>, ApiError> {
    let tokens = issue_token_pair(&user, &state.cfg.auth)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(Json(tokens))
}

/// Token invalidation happens client-side; the endpoint just acknowledges.
async fn logout(CurrentUser(_user): CurrentUser) -> ApiResponse<()> {
    ApiResponse::message("Logged out successfully")
}

async fn create_demo_users(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    if state.cfg.environment != Environment::Development {
        return Err(ApiError::Forbidden);
    }

    ensure_demo_users(state.store.as_ref())
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(ApiResponse::success(
        "Demo users created successfully",
        json!({
            "credentials": [
                {"username": "demo", "password": "demo123", "role": "user"},
                {"username": "admin", "password": "admin123", "role": "admin"},
                {"username": "operator", "password": "operator123", "role": "operator"},
            ],
        }),
    ))
}

/// Placeholder: a real deployment would mail a reset token.
async fn password_reset_request(
    Json(req): Json<PasswordResetRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    req.validate()?;
    Ok(ApiResponse::message(
        "Password reset email sent (if email exists)",
    ))
}

/// Placeholder: a real deployment would validate the token.
async fn password_reset(Json(req): Json<PasswordReset>) -> Result<ApiResponse<()>, ApiError> {
    req.validate()?;
    Ok(ApiResponse::message("Password reset successfully"))
}
