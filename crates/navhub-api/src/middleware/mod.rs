//! Request extractors that run before handlers

pub mod auth;

pub use auth::{AdminUser, AuthUser};
