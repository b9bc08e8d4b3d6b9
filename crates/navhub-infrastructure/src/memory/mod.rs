//! In-memory implementation of every repository port.
//!
//! # Purpose
//! Backs local development and the HTTP tests without an external database.
//! All state is lost on restart.
//!
//! # Consistency
//! Menus, nodes and the sequence counters live behind a single `RwLock`, so the
//! capacity checks and the writes they guard run under one write lock. Users sit
//! behind their own lock since no hierarchy operation touches them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use navhub_core::domain::{
    ensure_acyclic_move, DeleteOutcome, Menu, NewMenu, Node, NodeChanges, OrphanPolicy, ParentRef, User,
};
use navhub_core::error::DomainError;
use navhub_core::repositories::{MenuRepository, NodeRepository, StoreHealth, UserRepository};
use navhub_core::services::CapacityPolicy;
use navhub_shared::constants::MENU_SEQUENCE_NAME;
use navhub_shared::utils::mask_email;

#[derive(Debug, Default)]
struct Hierarchy {
    menus: HashMap<Uuid, Menu>,
    nodes: HashMap<Uuid, Node>,
    counters: HashMap<String, i64>,
}

impl Hierarchy {
    fn parent_exists(&self, parent: &ParentRef) -> bool {
        match parent {
            ParentRef::Menu(id) => self.menus.contains_key(id),
            ParentRef::Node(id) => self.nodes.contains_key(id),
        }
    }

    fn count_children(&self, parent: &ParentRef, exclude: Option<Uuid>) -> usize {
        self.nodes
            .values()
            .filter(|n| n.parent == *parent && Some(n.id) != exclude)
            .count()
    }

    fn next_value(&mut self, name: &str) -> i64 {
        let value = self.counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        *value
    }

    /// Removes every node below `parent`. Returns the number removed.
    fn remove_subtree(&mut self, parent: &ParentRef) -> usize {
        let mut doomed = HashSet::new();
        let mut frontier = vec![*parent];

        while let Some(current) = frontier.pop() {
            for node in self.nodes.values().filter(|n| n.parent == current) {
                if doomed.insert(node.id) {
                    frontier.push(ParentRef::Node(node.id));
                }
            }
        }

        self.nodes.retain(|id, _| !doomed.contains(id));
        doomed.len()
    }

    fn admit_child(
        &self,
        parent: &ParentRef,
        exclude: Option<Uuid>,
        capacity: &CapacityPolicy,
    ) -> Result<(), DomainError> {
        if !self.parent_exists(parent) {
            return Err(DomainError::ParentNotFound(*parent));
        }
        capacity.check_parent_capacity(parent, self.count_children(parent, exclude))
    }
}

fn sorted_nodes<'a>(nodes: impl Iterator<Item = &'a Node>) -> Vec<Node> {
    let mut out: Vec<Node> = nodes.cloned().collect();
    out.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    out
}

/// Shared in-memory store; clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    hierarchy: Arc<RwLock<Hierarchy>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        users.insert(user.id, user.clone());

        info!("User created: {} ({})", user.id, mask_email(&user.email));
        Ok(user.clone())
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        let mut menus: Vec<Menu> = self.hierarchy.read().await.menus.values().cloned().collect();
        menus.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.sequence_number.cmp(&b.sequence_number))
        });
        Ok(menus)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        Ok(self.hierarchy.read().await.menus.get(id).cloned())
    }

    async fn create(&self, menu: &NewMenu, capacity: &CapacityPolicy) -> Result<Menu, DomainError> {
        let mut state = self.hierarchy.write().await;

        capacity.check_menu_capacity(state.menus.len())?;
        let sequence_number = state.next_value(MENU_SEQUENCE_NAME);
        let created = menu.clone().into_menu(sequence_number);
        state.menus.insert(created.id, created.clone());

        info!("Menu created: {} (#{})", created.id, created.sequence_number);
        Ok(created)
    }

    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let mut state = self.hierarchy.write().await;
        let stored = state
            .menus
            .get_mut(&menu.id)
            .ok_or(DomainError::MenuNotFound(menu.id))?;

        stored.name = menu.name.clone();
        stored.display_order = menu.display_order;
        stored.modified_at = menu.modified_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid, policy: OrphanPolicy) -> Result<DeleteOutcome, DomainError> {
        let mut state = self.hierarchy.write().await;
        if !state.menus.contains_key(id) {
            return Err(DomainError::MenuNotFound(*id));
        }

        let as_parent = ParentRef::Menu(*id);
        let mut outcome = DeleteOutcome::default();
        match policy {
            OrphanPolicy::Orphan => {}
            OrphanPolicy::Cascade => {
                outcome.removed_descendants = state.remove_subtree(&as_parent);
            }
            OrphanPolicy::Reparent => {
                let children = state.count_children(&as_parent, None);
                if children > 0 {
                    return Err(DomainError::ValidationError(format!(
                        "Menu still has {children} child nodes. Move or delete them first."
                    )));
                }
            }
        }

        state.menus.remove(id);
        debug!(menu_id = %id, removed_descendants = outcome.removed_descendants, "Menu removed from memory");
        Ok(outcome)
    }
}

#[async_trait]
impl NodeRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Node>, DomainError> {
        let state = self.hierarchy.read().await;
        Ok(sorted_nodes(state.nodes.values()))
    }

    async fn list_by_parent(&self, parent: &ParentRef) -> Result<Vec<Node>, DomainError> {
        let state = self.hierarchy.read().await;
        Ok(sorted_nodes(state.nodes.values().filter(|n| n.parent == *parent)))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Node>, DomainError> {
        Ok(self.hierarchy.read().await.nodes.get(id).cloned())
    }

    async fn create(&self, node: &Node, capacity: &CapacityPolicy) -> Result<Node, DomainError> {
        let mut state = self.hierarchy.write().await;

        state.admit_child(&node.parent, None, capacity)?;
        state.nodes.insert(node.id, node.clone());

        info!("Node created: {} under {}", node.id, node.parent);
        Ok(node.clone())
    }

    async fn update(&self, id: &Uuid, changes: &NodeChanges, capacity: &CapacityPolicy) -> Result<Node, DomainError> {
        let mut state = self.hierarchy.write().await;
        let mut node = state.nodes.get(id).cloned().ok_or(DomainError::NodeNotFound(*id))?;

        if node.apply_changes(changes)? {
            ensure_acyclic_move(*id, &node.parent, |ancestor| state.nodes.get(ancestor).map(|n| n.parent))?;
            state.admit_child(&node.parent, Some(*id), capacity)?;
            debug!(node_id = %id, parent = %node.parent, "Node moved in memory");
        }

        state.nodes.insert(*id, node.clone());
        Ok(node)
    }

    async fn delete(
        &self,
        id: &Uuid,
        policy: OrphanPolicy,
        capacity: &CapacityPolicy,
    ) -> Result<DeleteOutcome, DomainError> {
        let mut state = self.hierarchy.write().await;
        let grandparent = state
            .nodes
            .get(id)
            .map(|n| n.parent)
            .ok_or(DomainError::NodeNotFound(*id))?;

        let as_parent = ParentRef::Node(*id);
        let mut outcome = DeleteOutcome::default();
        match policy {
            OrphanPolicy::Orphan => {}
            OrphanPolicy::Cascade => {
                outcome.removed_descendants = state.remove_subtree(&as_parent);
            }
            OrphanPolicy::Reparent => {
                let children = state.count_children(&as_parent, None);
                if children > 0 {
                    let siblings = state.count_children(&grandparent, Some(*id));
                    capacity.check_adoption(&grandparent, siblings, children)?;

                    let now = Utc::now();
                    for child in state.nodes.values_mut().filter(|n| n.parent == as_parent) {
                        child.parent = grandparent;
                        child.modified_at = Some(now);
                    }
                    outcome.reparented = children;
                }
            }
        }

        state.nodes.remove(id);
        debug!(node_id = %id, ?outcome, "Node removed from memory");
        Ok(outcome)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navhub_core::domain::{Role, TemplateType};
    use serde_json::json;

    fn policy() -> CapacityPolicy {
        CapacityPolicy::default()
    }

    async fn menu(store: &MemoryStore, name: &str) -> Menu {
        MenuRepository::create(store, &NewMenu::new(name, None).unwrap(), &policy())
            .await
            .unwrap()
    }

    fn move_to(parent: ParentRef) -> NodeChanges {
        NodeChanges {
            parent: Some(parent),
            ..Default::default()
        }
    }

    async fn node(store: &MemoryStore, parent: ParentRef, template: TemplateType) -> Result<Node, DomainError> {
        let node = Node::new("Item", parent, template, None, None).unwrap();
        NodeRepository::create(store, &node, &policy()).await
    }

    #[tokio::test]
    async fn test_menu_capacity_and_sequence() {
        let store = MemoryStore::new();
        let mut sequences = Vec::new();
        for i in 0..10 {
            sequences.push(menu(&store, &format!("Menu {i}")).await.sequence_number);
        }
        assert_eq!(sequences, (1..=10).collect::<Vec<i64>>());

        let err = MenuRepository::create(&store, &NewMenu::new("Eleventh", None).unwrap(), &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MenuCapacityExceeded { max: 10 }));
    }

    #[tokio::test]
    async fn test_sequence_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = menu(&store, "A").await;
        MenuRepository::delete(&store, &first.id, OrphanPolicy::Orphan).await.unwrap();

        let second = menu(&store, "B").await;
        assert_eq!(second.sequence_number, 2);
    }

    #[tokio::test]
    async fn test_concurrent_menu_creation_respects_limit() {
        let store = MemoryStore::new();
        let tasks: Vec<_> = (0..15)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let draft = NewMenu::new(&format!("Menu {i}"), None).unwrap();
                    MenuRepository::create(&store, &draft, &CapacityPolicy::default()).await
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        let mut sequences: Vec<i64> = results
            .into_iter()
            .filter_map(|r| r.unwrap().ok())
            .map(|m| m.sequence_number)
            .collect();
        sequences.sort();

        assert_eq!(sequences, (1..=10).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_concurrent_children_respect_limit() {
        let store = MemoryStore::new();
        let parent = ParentRef::Menu(menu(&store, "Root").await.id);

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let node = Node::new("Child", parent, TemplateType::Grid, None, None).unwrap();
                    NodeRepository::create(&store, &node, &CapacityPolicy::default()).await
                })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 5);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::ParentCapacityExceeded { max: 5, .. }))));
        assert_eq!(store.list_by_parent(&parent).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_missing_parent_rejected() {
        let store = MemoryStore::new();
        let err = node(&store, ParentRef::Node(Uuid::new_v4()), TemplateType::Grid)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound(ParentRef::Node(_))));

        // A menu id does not resolve as a node parent.
        let root = menu(&store, "Root").await;
        let err = node(&store, ParentRef::Node(root.id), TemplateType::Grid)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn test_reparent_into_full_parent() {
        let store = MemoryStore::new();
        let full = ParentRef::Menu(menu(&store, "Full").await.id);
        let other = ParentRef::Menu(menu(&store, "Other").await.id);
        for _ in 0..5 {
            node(&store, full, TemplateType::Grid).await.unwrap();
        }

        let mover = node(&store, other, TemplateType::Grid).await.unwrap();
        let err = NodeRepository::update(&store, &mover.id, &move_to(full), &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentCapacityExceeded { .. }));
        assert_eq!(store.list_by_parent(&other).await.unwrap().len(), 1);

        // Naming the current parent again is not a move.
        let sibling = store.list_by_parent(&full).await.unwrap().remove(0);
        let changes = NodeChanges {
            name: Some("Renamed".into()),
            parent: Some(full),
            ..Default::default()
        };
        let renamed = NodeRepository::update(&store, &sibling.id, &changes, &policy()).await.unwrap();
        assert_eq!(renamed.name, "Renamed");
    }

    #[tokio::test]
    async fn test_rename_after_concurrent_move_keeps_new_parent() {
        let store = MemoryStore::new();
        let first = ParentRef::Menu(menu(&store, "First").await.id);
        let second = ParentRef::Menu(menu(&store, "Second").await.id);
        let mover = node(&store, first, TemplateType::Grid).await.unwrap();

        // A rename was issued while the node still sat under `first`; the move
        // and a refill of `first` land before the rename is applied.
        let rename = NodeChanges {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        NodeRepository::update(&store, &mover.id, &move_to(second), &policy()).await.unwrap();
        for _ in 0..5 {
            node(&store, first, TemplateType::Grid).await.unwrap();
        }

        let renamed = NodeRepository::update(&store, &mover.id, &rename, &policy()).await.unwrap();
        assert_eq!(renamed.parent, second);
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(store.list_by_parent(&first).await.unwrap().len(), 5);

        // Sending the old parent back is a move into a full parent.
        let err = NodeRepository::update(&store, &mover.id, &move_to(first), &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentCapacityExceeded { .. }));
        assert_eq!(store.list_by_parent(&first).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_opposing_concurrent_moves_cannot_form_a_loop() {
        let store = MemoryStore::new();
        let root = ParentRef::Menu(menu(&store, "Root").await.id);
        let a = node(&store, root, TemplateType::Container).await.unwrap();
        let b = node(&store, root, TemplateType::Container).await.unwrap();

        let moves = [(a.id, b.id), (b.id, a.id)].map(|(mover, target)| {
            let store = store.clone();
            tokio::spawn(async move {
                NodeRepository::update(&store, &mover, &move_to(ParentRef::Node(target)), &policy()).await
            })
        });

        let results: Vec<_> = futures::future::join_all(moves)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Err(DomainError::HierarchyCycle(_)))));

        // Both nodes still reach the menu.
        let menu_children = store.list_by_parent(&root).await.unwrap();
        assert_eq!(menu_children.len(), 1);
        let top = menu_children[0].id;
        let nested = store.list_by_parent(&ParentRef::Node(top)).await.unwrap();
        assert_eq!(nested.len(), 1);
    }

    #[tokio::test]
    async fn test_move_under_own_descendant_rejected() {
        let store = MemoryStore::new();
        let root = ParentRef::Menu(menu(&store, "Root").await.id);
        let outer = node(&store, root, TemplateType::Container).await.unwrap();
        let inner = node(&store, ParentRef::Node(outer.id), TemplateType::Container).await.unwrap();

        for target in [inner.id, outer.id] {
            let err = NodeRepository::update(&store, &outer.id, &move_to(ParentRef::Node(target)), &policy())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::HierarchyCycle(id) if id == outer.id));
        }
        let stored = NodeRepository::find_by_id(&store, &outer.id).await.unwrap().unwrap();
        assert_eq!(stored.parent, root);
    }

    #[tokio::test]
    async fn test_update_missing_node() {
        let store = MemoryStore::new();
        let err = NodeRepository::update(&store, &Uuid::new_v4(), &NodeChanges::default(), &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_cascade_removes_subtree() {
        let store = MemoryStore::new();
        let root = menu(&store, "Root").await;
        let section = node(&store, ParentRef::Menu(root.id), TemplateType::Container).await.unwrap();
        let leaf = node(&store, ParentRef::Node(section.id), TemplateType::Table).await.unwrap();
        node(&store, ParentRef::Node(leaf.id), TemplateType::Grid).await.unwrap();

        let outcome = MenuRepository::delete(&store, &root.id, OrphanPolicy::Cascade).await.unwrap();
        assert_eq!(outcome.removed_descendants, 3);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orphan_policy_keeps_children() {
        let store = MemoryStore::new();
        let root = menu(&store, "Root").await;
        let child = node(&store, ParentRef::Menu(root.id), TemplateType::Grid).await.unwrap();

        MenuRepository::delete(&store, &root.id, OrphanPolicy::Orphan).await.unwrap();
        let kept = NodeRepository::find_by_id(&store, &child.id).await.unwrap().unwrap();
        assert_eq!(kept.parent, ParentRef::Menu(root.id));
    }

    #[tokio::test]
    async fn test_reparent_moves_children_to_grandparent() {
        let store = MemoryStore::new();
        let root = ParentRef::Menu(menu(&store, "Root").await.id);
        let section = node(&store, root, TemplateType::Container).await.unwrap();
        for _ in 0..3 {
            node(&store, ParentRef::Node(section.id), TemplateType::Grid).await.unwrap();
        }

        let outcome = NodeRepository::delete(&store, &section.id, OrphanPolicy::Reparent, &policy())
            .await
            .unwrap();
        assert_eq!(outcome.reparented, 3);
        assert_eq!(store.list_by_parent(&root).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reparent_refused_when_grandparent_would_overflow() {
        let store = MemoryStore::new();
        let root = ParentRef::Menu(menu(&store, "Root").await.id);
        let section = node(&store, root, TemplateType::Container).await.unwrap();
        for _ in 0..4 {
            node(&store, root, TemplateType::Grid).await.unwrap();
        }
        for _ in 0..2 {
            node(&store, ParentRef::Node(section.id), TemplateType::Grid).await.unwrap();
        }

        let err = NodeRepository::delete(&store, &section.id, OrphanPolicy::Reparent, &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentCapacityExceeded { .. }));
        assert!(NodeRepository::find_by_id(&store, &section.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reparent_policy_refuses_non_empty_menu() {
        let store = MemoryStore::new();
        let root = menu(&store, "Root").await;
        node(&store, ParentRef::Menu(root.id), TemplateType::Grid).await.unwrap();

        let err = MenuRepository::delete(&store, &root.id, OrphanPolicy::Reparent).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_content_items_round_trip_in_order() {
        let store = MemoryStore::new();
        let root = menu(&store, "Root").await;
        let items = vec![json!({"title": "b"}), json!({"title": "a"}), json!(3)];
        let created = Node::new("Gallery", ParentRef::Menu(root.id), TemplateType::Gallery, None, Some(items.clone()))
            .unwrap();
        NodeRepository::create(&store, &created, &policy()).await.unwrap();

        let fetched = NodeRepository::find_by_id(&store, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.content_items, items);
    }

    #[tokio::test]
    async fn test_duplicate_email_ignores_case() {
        let store = MemoryStore::new();
        let user = User::new("alice".into(), "alice@example.com".into(), "hash".into(), Role::User).unwrap();
        UserRepository::create(&store, &user).await.unwrap();

        let twin = User::new("alice2".into(), "ALICE@example.com".into(), "hash".into(), Role::User).unwrap();
        let err = UserRepository::create(&store, &twin).await.unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists(_)));
        assert!(store.find_by_email("Alice@Example.com").await.unwrap().is_some());
    }
}
