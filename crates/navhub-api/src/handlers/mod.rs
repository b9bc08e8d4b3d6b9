//! HTTP handlers

pub mod auth;
pub mod health;
pub mod menus;
pub mod nodes;
pub mod users;
