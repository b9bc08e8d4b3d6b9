//! Domain services (business logic)

pub mod access_policy;
pub mod capacity_policy;
pub mod auth_service;
pub mod hierarchy_service;

pub use access_policy::{AccessPolicy, Capability, Principal};
pub use capacity_policy::CapacityPolicy;
pub use auth_service::{AuthResult, AuthService, RegisterInput, UserInfo};
pub use hierarchy_service::{HierarchyService, MenuChanges, NewNodeInput};
