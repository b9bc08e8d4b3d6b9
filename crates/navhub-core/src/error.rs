//! Domain errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::ParentRef;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User already exists with this email: {0}")]
    EmailAlreadyExists(String),

    #[error("Role {role} is not authorized to access this resource")]
    Forbidden { role: String },

    #[error("Menu not found: {0}")]
    MenuNotFound(Uuid),

    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("{0} parent not found")]
    ParentNotFound(ParentRef),

    #[error("Maximum of {max} menus allowed. Cannot create more.")]
    MenuCapacityExceeded { max: usize },

    #[error("Maximum of {max} nodes allowed under {parent}. Cannot add more.")]
    ParentCapacityExceeded { parent: ParentRef, max: usize },

    #[error("Node {0} cannot be moved under itself or one of its descendants")]
    HierarchyCycle(Uuid),

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
