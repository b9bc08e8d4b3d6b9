// ============================================================================
// NavHub API - Bearer Authentication
// File: crates/navhub-api/src/middleware/auth.rs
// ============================================================================

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use tracing::warn;

use navhub_core::services::{AccessPolicy, Capability, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// Caller decoded from `Authorization: Bearer <token>`.
///
/// Handlers that take this extractor reject anonymous requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".into()))?;

        let principal = state.auth.authenticate_token(token).map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::Unauthorized("Not authorized, token failed".into())
        })?;

        Ok(AuthUser(principal))
    }
}

/// Caller allowed to change the hierarchy.
///
/// Must come before path and body extractors in a handler's argument list so
/// a non-admin gets 403 whatever the rest of the request looks like.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Principal);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        AccessPolicy::authorize(&principal, Capability::ManageHierarchy)?;
        Ok(AdminUser(principal))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
