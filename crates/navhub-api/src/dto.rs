// ============================================================================
// NavHub API - Data Transfer Objects
// File: crates/navhub-api/src/dto.rs
// ============================================================================
//! Wire shapes for requests and responses (camelCase JSON).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use navhub_core::domain::{ContentItem, Menu, Node, ParentKind, ParentRef, Role, TemplateType};
use navhub_core::services::{AuthResult, UserInfo};
use navhub_shared::types::parse_id;
use navhub_shared::utils::normalize_email;

use crate::error::ApiError;

// ----------------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Option<Role>,
}

impl RegisterRequest {
    /// Trims and lowercases the email so validation sees what gets stored.
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<UserInfo> for UserResponse {
    fn from(user: UserInfo) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user.into(),
            token: result.token,
        }
    }
}

// ----------------------------------------------------------------------------
// Menus
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MenuRequest {
    pub name: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDto {
    pub id: Uuid,
    pub menu_id: i64,
    pub name: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Menu> for MenuDto {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            menu_id: menu.sequence_number,
            name: menu.name,
            order: menu.display_order,
            created_at: menu.created_at,
            updated_at: menu.modified_at.unwrap_or(menu.created_at),
        }
    }
}

// ----------------------------------------------------------------------------
// Nodes
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeQuery {
    pub parent_id: Option<String>,
    pub parent_model: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub parent_model: Option<String>,
    pub template_type: Option<String>,
    pub order: Option<i32>,
    pub content_items: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeRequest {
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub parent_model: Option<String>,
    pub template_type: Option<String>,
    pub order: Option<i32>,
    pub content_items: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Uuid,
    pub parent_model: &'static str,
    pub template_type: TemplateType,
    pub order: i32,
    pub content_items: Vec<ContentItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Node> for NodeDto {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            name: node.name,
            parent_id: node.parent.id(),
            parent_model: node.parent.kind().as_str(),
            template_type: node.template_type,
            order: node.display_order,
            content_items: node.content_items,
            created_at: node.created_at,
            updated_at: node.modified_at.unwrap_or(node.created_at),
        }
    }
}

/// Reads an optional `(parentId, parentModel)` pair; supplying only one half is an error.
pub fn parse_parent(
    parent_id: Option<&str>,
    parent_model: Option<&str>,
    missing_half: &str,
) -> Result<Option<ParentRef>, ApiError> {
    match (parent_id, parent_model) {
        (None, None) => Ok(None),
        (Some(id), Some(model)) => {
            let kind = ParentKind::from_str(model.trim())
                .ok_or_else(|| ApiError::Validation(format!("Invalid parentModel: {model}")))?;
            let id = parse_id(id).ok_or_else(|| ApiError::Validation(format!("Invalid parentId: {id}")))?;
            Ok(Some(ParentRef::new(kind, id)))
        }
        _ => Err(ApiError::Validation(missing_half.to_string())),
    }
}

pub fn parse_template(raw: &str) -> Result<TemplateType, ApiError> {
    TemplateType::from_str(raw.trim())
        .ok_or_else(|| ApiError::Validation(format!("Invalid templateType: {raw}")))
}

/// `contentItems` must be a JSON array; `null` counts as absent.
pub fn parse_content_items(raw: Option<Value>) -> Result<Option<Vec<ContentItem>>, ApiError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(ApiError::Validation("Content items must be an array.".into())),
    }
}
