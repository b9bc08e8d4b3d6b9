//! Common types

use uuid::Uuid;

pub type EntityId = Uuid;

/// Parses an identifier received over the wire, ignoring surrounding whitespace.
pub fn parse_id(raw: &str) -> Option<EntityId> {
    Uuid::parse_str(raw.trim()).ok()
}
