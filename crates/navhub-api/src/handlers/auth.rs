// ============================================================================
// NavHub API - Auth Handlers
// File: crates/navhub-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (register, login, current user)

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use navhub_core::services::RegisterInput;

use crate::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Register handler - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let payload = payload.normalized();
    payload.validate()?;

    let result = state
        .auth
        .register(RegisterInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Login handler - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let result = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(result.into()))
}

/// Current user - GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth.current_user(&principal).await?;
    Ok(Json(user.into()))
}
