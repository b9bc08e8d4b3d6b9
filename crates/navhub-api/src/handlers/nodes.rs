// ============================================================================
// NavHub API - Node Handlers
// File: crates/navhub-api/src/handlers/nodes.rs
// ============================================================================

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use navhub_core::domain::NodeChanges;
use navhub_core::services::NewNodeInput;

use crate::dto::{
    parse_content_items, parse_parent, parse_template, CreateNodeRequest, NodeDto, NodeQuery,
    UpdateNodeRequest,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AdminUser;
use crate::response::DeletedResponse;
use crate::state::AppState;

const REQUIRED_FIELDS: &str = "Please include all required fields: name, parentId, parentModel, templateType";

/// GET /api/nodes?parentId=..&parentModel=..
///
/// Without either parameter every node is returned.
pub async fn list_nodes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NodeQuery>,
) -> Result<Json<Vec<NodeDto>>, ApiError> {
    let parent = parse_parent(
        query.parent_id.as_deref(),
        query.parent_model.as_deref(),
        "Both parentId and parentModel must be provided for filtered nodes.",
    )?;

    let nodes = state.hierarchy.list_nodes(parent.as_ref()).await?;
    Ok(Json(nodes.into_iter().map(NodeDto::from).collect()))
}

/// GET /api/nodes/{id}
pub async fn get_node(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<NodeDto>, ApiError> {
    let node = state.hierarchy.get_node(&id).await?;
    Ok(Json(node.into()))
}

/// POST /api/nodes (admin)
pub async fn create_node(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiJson(payload): ApiJson<CreateNodeRequest>,
) -> Result<(StatusCode, Json<NodeDto>), ApiError> {
    let (Some(name), Some(template_type)) = (payload.name, payload.template_type) else {
        return Err(ApiError::Validation(REQUIRED_FIELDS.into()));
    };
    let parent = parse_parent(
        payload.parent_id.as_deref(),
        payload.parent_model.as_deref(),
        REQUIRED_FIELDS,
    )?
    .ok_or_else(|| ApiError::Validation(REQUIRED_FIELDS.into()))?;

    let input = NewNodeInput {
        name,
        parent,
        template_type: parse_template(&template_type)?,
        display_order: payload.order,
        content_items: parse_content_items(payload.content_items)?,
    };

    let node = state.hierarchy.create_node(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(node.into())))
}

/// PUT /api/nodes/{id} (admin)
pub async fn update_node(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateNodeRequest>,
) -> Result<Json<NodeDto>, ApiError> {
    let parent = parse_parent(
        payload.parent_id.as_deref(),
        payload.parent_model.as_deref(),
        "Both parentId and parentModel must be provided if changing parent.",
    )?;

    let changes = NodeChanges {
        name: payload.name,
        display_order: payload.order,
        template_type: payload.template_type.as_deref().map(parse_template).transpose()?,
        content_items: parse_content_items(payload.content_items)?,
        parent,
    };

    let node = state.hierarchy.update_node(&principal, &id, changes).await?;
    Ok(Json(node.into()))
}

/// DELETE /api/nodes/{id} (admin)
pub async fn delete_node(
    State(state): State<AppState>,
    AdminUser(principal): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let outcome = state.hierarchy.delete_node(&principal, &id).await?;
    Ok(Json(DeletedResponse::new("Node removed", outcome)))
}
