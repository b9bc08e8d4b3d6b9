//! Per-level child limits.
//!
//! The checks are pure: stores call them from inside the lock or transaction
//! that also performs the guarded insert or move.

use navhub_shared::constants::{DEFAULT_MAX_CHILDREN_PER_PARENT, DEFAULT_MAX_MENUS};
use tracing::warn;

use crate::domain::ParentRef;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    max_menus: usize,
    max_children_per_parent: usize,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MENUS, DEFAULT_MAX_CHILDREN_PER_PARENT)
    }
}

impl CapacityPolicy {
    pub fn new(max_menus: usize, max_children_per_parent: usize) -> Self {
        Self {
            max_menus,
            max_children_per_parent,
        }
    }

    pub fn max_menus(&self) -> usize {
        self.max_menus
    }

    pub fn max_children_per_parent(&self) -> usize {
        self.max_children_per_parent
    }

    /// `existing` is the current number of menus.
    pub fn check_menu_capacity(&self, existing: usize) -> Result<(), DomainError> {
        if existing >= self.max_menus {
            warn!(existing, max = self.max_menus, "Menu capacity reached");
            return Err(DomainError::MenuCapacityExceeded { max: self.max_menus });
        }
        Ok(())
    }

    /// `siblings` is the number of nodes already under `parent`, not counting
    /// the node being inserted or moved.
    pub fn check_parent_capacity(&self, parent: &ParentRef, siblings: usize) -> Result<(), DomainError> {
        self.check_adoption(parent, siblings, 1)
    }

    /// Same as [`check_parent_capacity`](Self::check_parent_capacity) for `incoming` nodes at once.
    pub fn check_adoption(
        &self,
        parent: &ParentRef,
        siblings: usize,
        incoming: usize,
    ) -> Result<(), DomainError> {
        if siblings + incoming > self.max_children_per_parent {
            warn!(
                parent = %parent,
                siblings,
                incoming,
                max = self.max_children_per_parent,
                "Parent capacity reached"
            );
            return Err(DomainError::ParentCapacityExceeded {
                parent: *parent,
                max: self.max_children_per_parent,
            });
        }
        Ok(())
    }
}
