// ============================================================================
// NavHub Core - Node Entity
// File: crates/navhub-core/src/domain/node.rs
// Description: Navigation node living under a Menu or another Node
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use std::collections::HashSet;

use super::parent::ParentRef;
use crate::error::DomainError;

/// Opaque content record attached to a node.
pub type ContentItem = serde_json::Value;

/// Presentation template of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Grid,
    Gallery,
    Table,
    /// Hosts child nodes only, never content.
    #[serde(alias = "submenu")]
    Container,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Grid => "grid",
            TemplateType::Gallery => "gallery",
            TemplateType::Table => "table",
            TemplateType::Container => "container",
        }
    }

    /// Accepts `submenu` as a legacy spelling of `container`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(TemplateType::Grid),
            "gallery" => Some(TemplateType::Gallery),
            "table" => Some(TemplateType::Table),
            "container" | "submenu" => Some(TemplateType::Container),
            _ => None,
        }
    }
}

/// Partial node update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChanges {
    pub name: Option<String>,
    pub display_order: Option<i32>,
    pub template_type: Option<TemplateType>,
    pub content_items: Option<Vec<ContentItem>>,
    pub parent: Option<ParentRef>,
}

/// Node entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Node {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Node name must be between 1 and 100 characters"))]
    pub name: String,

    pub parent: ParentRef,
    pub template_type: TemplateType,
    pub display_order: i32,
    pub content_items: Vec<ContentItem>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Node {
    pub fn new(
        name: &str,
        parent: ParentRef,
        template_type: TemplateType,
        display_order: Option<i32>,
        content_items: Option<Vec<ContentItem>>,
    ) -> Result<Self, validator::ValidationErrors> {
        let mut node = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            parent,
            template_type,
            display_order: display_order.unwrap_or(0),
            content_items: content_items.unwrap_or_default(),
            created_at: Utc::now(),
            modified_at: None,
        };

        node.enforce_content_rule();
        node.validate()?;
        Ok(node)
    }

    pub fn is_container(&self) -> bool {
        self.template_type == TemplateType::Container
    }

    pub fn rename(&mut self, name: &str) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.validate()
    }

    /// Applies a template change and/or new content, keeping containers empty.
    pub fn set_template_and_content(
        &mut self,
        template_type: Option<TemplateType>,
        content_items: Option<Vec<ContentItem>>,
    ) {
        if let Some(template_type) = template_type {
            self.template_type = template_type;
        }
        if let Some(items) = content_items {
            self.content_items = items;
        }
        self.enforce_content_rule();
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }

    /// Merges `changes` into the node and returns whether the parent changed.
    ///
    /// Must be applied to the freshly stored row inside the store's critical
    /// section; a supplied parent equal to the current one is not a move.
    pub fn apply_changes(&mut self, changes: &NodeChanges) -> Result<bool, validator::ValidationErrors> {
        let moved = match changes.parent {
            Some(parent) if parent != self.parent => {
                self.parent = parent;
                true
            }
            _ => false,
        };
        if let Some(name) = changes.name.as_deref() {
            self.rename(name)?;
        }
        if let Some(order) = changes.display_order {
            self.display_order = order;
        }
        self.set_template_and_content(changes.template_type, changes.content_items.clone());
        self.touch();
        Ok(moved)
    }

    fn enforce_content_rule(&mut self) {
        if self.is_container() {
            self.content_items.clear();
        }
    }
}

/// Fails if moving `node_id` under `new_parent` would make it its own ancestor.
///
/// `parent_of` looks up the current parent of a node; the walk stops at a
/// Menu, a missing node, or a loop that does not involve `node_id`.
pub fn ensure_acyclic_move(
    node_id: Uuid,
    new_parent: &ParentRef,
    mut parent_of: impl FnMut(&Uuid) -> Option<ParentRef>,
) -> Result<(), DomainError> {
    let mut visited = HashSet::new();
    let mut cursor = *new_parent;

    while let ParentRef::Node(ancestor_id) = cursor {
        if ancestor_id == node_id {
            return Err(DomainError::HierarchyCycle(node_id));
        }
        if !visited.insert(ancestor_id) {
            break;
        }
        match parent_of(&ancestor_id) {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    Ok(())
}
