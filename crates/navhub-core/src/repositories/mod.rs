//! Repository traits (ports)

pub mod user_repository;
pub mod menu_repository;
pub mod node_repository;
pub mod store_health;

pub use user_repository::UserRepository;
pub use menu_repository::MenuRepository;
pub use node_repository::NodeRepository;
pub use store_health::StoreHealth;

#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use menu_repository::MockMenuRepository;
#[cfg(test)]
pub use node_repository::MockNodeRepository;
