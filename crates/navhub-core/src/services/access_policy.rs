//! Role-based guard placed in front of every mutating operation.

use tracing::warn;
use uuid::Uuid;

use crate::domain::Role;
use crate::error::DomainError;

/// Authenticated caller, decoded from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Operations that need more than anonymous read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageHierarchy,
    ManageUsers,
}

impl Capability {
    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::ManageHierarchy | Capability::ManageUsers => &[Role::Admin],
        }
    }
}

pub struct AccessPolicy;

impl AccessPolicy {
    pub fn authorize(principal: &Principal, capability: Capability) -> Result<(), DomainError> {
        if capability.allowed_roles().contains(&principal.role) {
            return Ok(());
        }

        warn!(
            user_id = %principal.user_id,
            role = principal.role.as_str(),
            ?capability,
            "Access denied"
        );
        Err(DomainError::Forbidden {
            role: principal.role.as_str().to_string(),
        })
    }
}
