// ============================================================================
// NavHub Core - Parent Reference
// File: crates/navhub-core/src/domain/parent.rs
// Description: Tagged reference from a node to its Menu or Node parent
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of record a node's parent id resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentKind {
    Menu,
    #[serde(alias = "Submenu")]
    Node,
}

impl ParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Menu => "Menu",
            ParentKind::Node => "Node",
        }
    }

    /// Accepts `Submenu` as a legacy spelling of `Node`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Menu" => Some(ParentKind::Menu),
            "Node" | "Submenu" => Some(ParentKind::Node),
            _ => None,
        }
    }
}

/// Parent of a node: either a top-level menu or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentRef {
    Menu(Uuid),
    Node(Uuid),
}

impl ParentRef {
    pub fn new(kind: ParentKind, id: Uuid) -> Self {
        match kind {
            ParentKind::Menu => ParentRef::Menu(id),
            ParentKind::Node => ParentRef::Node(id),
        }
    }

    pub fn kind(&self) -> ParentKind {
        match self {
            ParentRef::Menu(_) => ParentKind::Menu,
            ParentRef::Node(_) => ParentKind::Node,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ParentRef::Menu(id) | ParentRef::Node(id) => *id,
        }
    }

    /// Stable string identifying the sibling group under this parent.
    pub fn lock_key(&self) -> String {
        format!("{}:{}", self.kind().as_str(), self.id())
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().as_str(), self.id())
    }
}
