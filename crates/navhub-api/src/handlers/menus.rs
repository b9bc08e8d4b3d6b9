// ============================================================================
// NavHub API - Menu Handlers
// File: crates/navhub-api/src/handlers/menus.rs
// ============================================================================

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use navhub_core::services::MenuChanges;

use crate::dto::{MenuDto, MenuRequest};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AdminUser;
use crate::response::DeletedResponse;
use crate::state::AppState;

/// GET /api/menus
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuDto>>, ApiError> {
    let menus = state.hierarchy.list_menus().await?;
    Ok(Json(menus.into_iter().map(MenuDto::from).collect()))
}

/// GET /api/menus/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MenuDto>, ApiError> {
    let menu = state.hierarchy.get_menu(&id).await?;
    Ok(Json(menu.into()))
}

/// POST /api/menus (admin)
pub async fn create_menu(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiJson(payload): ApiJson<MenuRequest>,
) -> Result<(StatusCode, Json<MenuDto>), ApiError> {
    let name = payload.name.unwrap_or_default();
    let menu = state
        .hierarchy
        .create_menu(&principal, &name, payload.order)
        .await?;
    Ok((StatusCode::CREATED, Json(menu.into())))
}

/// PUT /api/menus/{id} (admin)
pub async fn update_menu(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<MenuRequest>,
) -> Result<Json<MenuDto>, ApiError> {
    let changes = MenuChanges {
        name: payload.name,
        display_order: payload.order,
    };
    let menu = state.hierarchy.update_menu(&principal, &id, changes).await?;
    Ok(Json(menu.into()))
}

/// DELETE /api/menus/{id} (admin)
pub async fn delete_menu(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let outcome = state.hierarchy.delete_menu(&principal, &id).await?;
    Ok(Json(DeletedResponse::new("Menu removed", outcome)))
}
