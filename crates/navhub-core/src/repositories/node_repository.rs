//! Node repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{DeleteOutcome, Node, NodeChanges, OrphanPolicy, ParentRef};
use crate::error::DomainError;
use crate::services::CapacityPolicy;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Every node ordered by display order, then creation time.
    async fn list_all(&self) -> Result<Vec<Node>, DomainError>;
    /// Children of `parent` ordered by display order, then creation time.
    async fn list_by_parent(&self, parent: &ParentRef) -> Result<Vec<Node>, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Node>, DomainError>;

    /// Inserts the node under `node.parent`.
    ///
    /// Resolving the parent, counting its children and inserting happen
    /// atomically. Fails with `ParentNotFound` or `ParentCapacityExceeded`.
    async fn create(&self, node: &Node, capacity: &CapacityPolicy) -> Result<Node, DomainError>;

    /// Merges `changes` into the stored node.
    ///
    /// Reading the current row, merging and writing happen atomically. When the
    /// merge changes the parent, the cycle check, parent resolution and capacity
    /// check (not counting this node) run inside the same critical section.
    /// Fails with `NodeNotFound`, `HierarchyCycle`, `ParentNotFound`,
    /// `ParentCapacityExceeded` or `ValidationError`.
    async fn update(&self, id: &Uuid, changes: &NodeChanges, capacity: &CapacityPolicy) -> Result<Node, DomainError>;

    /// Removes the node, handling its children according to `policy`.
    async fn delete(
        &self,
        id: &Uuid,
        policy: OrphanPolicy,
        capacity: &CapacityPolicy,
    ) -> Result<DeleteOutcome, DomainError>;
}
