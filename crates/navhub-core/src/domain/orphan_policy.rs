//! What happens to the children of a deleted menu or node.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Delete only the record; children keep pointing at the missing parent.
    #[default]
    Orphan,
    /// Delete the record and every descendant node.
    Cascade,
    /// Move children of a deleted node to that node's parent.
    /// Menus have no parent, so deleting a menu that still has children is refused.
    Reparent,
}

impl OrphanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrphanPolicy::Orphan => "orphan",
            OrphanPolicy::Cascade => "cascade",
            OrphanPolicy::Reparent => "reparent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Some(OrphanPolicy::Orphan),
            "cascade" => Some(OrphanPolicy::Cascade),
            "reparent" => Some(OrphanPolicy::Reparent),
            _ => None,
        }
    }
}

/// Effect of a delete on the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// Nodes removed besides the target itself.
    pub removed_descendants: usize,
    /// Children moved to a new parent.
    pub reparented: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!(OrphanPolicy::from_str("Cascade"), Some(OrphanPolicy::Cascade));
        assert_eq!(OrphanPolicy::from_str(" reparent "), Some(OrphanPolicy::Reparent));
        assert_eq!(OrphanPolicy::from_str("orphan"), Some(OrphanPolicy::Orphan));
        assert_eq!(OrphanPolicy::from_str("keep"), None);
        assert_eq!(OrphanPolicy::default(), OrphanPolicy::Orphan);
    }
}
