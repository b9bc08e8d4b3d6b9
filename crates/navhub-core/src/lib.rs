//! # NavHub Core
//! 
//! Domain entities, policies, services, and repository traits for the navigation hierarchy.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
