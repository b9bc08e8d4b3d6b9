//! # NavHub Core - Domain Module
//! 
//! Domain entities for users and the navigation hierarchy.

pub mod user;
pub mod parent;
pub mod menu;
pub mod node;
pub mod orphan_policy;

pub use user::{User, Role};
pub use parent::{ParentKind, ParentRef};
pub use menu::{Menu, NewMenu};
pub use node::{ensure_acyclic_move, ContentItem, Node, NodeChanges, TemplateType};
pub use orphan_policy::{DeleteOutcome, OrphanPolicy};
