//! User administration handlers

use axum::{extract::State, Json};

use crate::dto::UserResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.auth.list_users(&principal).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
