//! Liveness and readiness probes

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub backend: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready - 503 when the store does not answer.
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ApiError> {
    state
        .health
        .health_check()
        .await
        .map_err(|e| {
            error!("Readiness check failed: {}", e);
            ApiError::ServiceUnavailable(format!("{} store unavailable", state.health.backend_name()))
        })?;

    Ok(Json(ReadyResponse {
        status: "ready",
        backend: state.health.backend_name(),
    }))
}
