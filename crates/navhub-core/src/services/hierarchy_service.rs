// ============================================================================
// NavHub Core - Hierarchy Service
// File: crates/navhub-core/src/services/hierarchy_service.rs
// ============================================================================
//! Menu and node operations.
//!
//! Every mutating method starts with the access guard, then hands a
//! capacity-guarded write to the store. Node updates are merged against the
//! stored row inside the store so moves are checked against current state.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{ContentItem, DeleteOutcome, Menu, NewMenu, Node, NodeChanges, OrphanPolicy, ParentRef, TemplateType};
use crate::error::DomainError;
use crate::repositories::{MenuRepository, NodeRepository};
use crate::services::access_policy::{AccessPolicy, Capability, Principal};
use crate::services::capacity_policy::CapacityPolicy;

/// Partial menu update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewNodeInput {
    pub name: String,
    pub parent: ParentRef,
    pub template_type: TemplateType,
    pub display_order: Option<i32>,
    pub content_items: Option<Vec<ContentItem>>,
}

pub struct HierarchyService {
    menus: Arc<dyn MenuRepository>,
    nodes: Arc<dyn NodeRepository>,
    capacity: CapacityPolicy,
    orphan_policy: OrphanPolicy,
}

impl HierarchyService {
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        nodes: Arc<dyn NodeRepository>,
        capacity: CapacityPolicy,
        orphan_policy: OrphanPolicy,
    ) -> Self {
        Self {
            menus,
            nodes,
            capacity,
            orphan_policy,
        }
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    pub async fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        self.menus.list().await
    }

    pub async fn get_menu(&self, id: &Uuid) -> Result<Menu, DomainError> {
        self.menus
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MenuNotFound(*id))
    }

    pub async fn create_menu(
        &self,
        actor: &Principal,
        name: &str,
        display_order: Option<i32>,
    ) -> Result<Menu, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let draft = NewMenu::new(name, display_order)?;
        let menu = self.menus.create(&draft, &self.capacity).await?;

        info!(menu_id = %menu.id, sequence_number = menu.sequence_number, actor = %actor.user_id, "Menu created");
        Ok(menu)
    }

    pub async fn update_menu(
        &self,
        actor: &Principal,
        id: &Uuid,
        changes: MenuChanges,
    ) -> Result<Menu, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let mut menu = self.get_menu(id).await?;
        if let Some(name) = changes.name.as_deref() {
            menu.rename(name)?;
        }
        if let Some(order) = changes.display_order {
            menu.display_order = order;
        }
        menu.touch();

        let updated = self.menus.update(&menu).await?;
        info!(menu_id = %updated.id, actor = %actor.user_id, "Menu updated");
        Ok(updated)
    }

    pub async fn delete_menu(&self, actor: &Principal, id: &Uuid) -> Result<DeleteOutcome, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let outcome = self.menus.delete(id, self.orphan_policy).await?;
        info!(
            menu_id = %id,
            policy = self.orphan_policy.as_str(),
            removed_descendants = outcome.removed_descendants,
            actor = %actor.user_id,
            "Menu deleted"
        );
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Children of `parent`, or every node when no parent is given.
    pub async fn list_nodes(&self, parent: Option<&ParentRef>) -> Result<Vec<Node>, DomainError> {
        match parent {
            Some(parent) => self.nodes.list_by_parent(parent).await,
            None => self.nodes.list_all().await,
        }
    }

    pub async fn get_node(&self, id: &Uuid) -> Result<Node, DomainError> {
        self.nodes
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NodeNotFound(*id))
    }

    pub async fn create_node(&self, actor: &Principal, input: NewNodeInput) -> Result<Node, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let node = Node::new(
            &input.name,
            input.parent,
            input.template_type,
            input.display_order,
            input.content_items,
        )?;
        let created = self.nodes.create(&node, &self.capacity).await?;

        info!(node_id = %created.id, parent = %created.parent, actor = %actor.user_id, "Node created");
        Ok(created)
    }

    pub async fn update_node(
        &self,
        actor: &Principal,
        id: &Uuid,
        changes: NodeChanges,
    ) -> Result<Node, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let updated = self.nodes.update(id, &changes, &self.capacity).await?;
        info!(node_id = %updated.id, parent = %updated.parent, actor = %actor.user_id, "Node updated");
        Ok(updated)
    }

    pub async fn delete_node(&self, actor: &Principal, id: &Uuid) -> Result<DeleteOutcome, DomainError> {
        AccessPolicy::authorize(actor, Capability::ManageHierarchy)?;

        let outcome = self.nodes.delete(id, self.orphan_policy, &self.capacity).await?;
        info!(
            node_id = %id,
            policy = self.orphan_policy.as_str(),
            removed_descendants = outcome.removed_descendants,
            reparented = outcome.reparented,
            actor = %actor.user_id,
            "Node deleted"
        );
        Ok(outcome)
    }
}
