//! # NavHub Infrastructure
//! 
//! Storage backends (adapters) for the repository ports in `navhub-core`.

pub mod database;
pub mod memory;
pub mod store;

pub use database::{connect, create_pool, run_migrations, PgMenuRepository, PgNodeRepository, PgStoreHealth, PgUserRepository};
pub use memory::MemoryStore;
pub use store::{build_store, Store, StoreBackend};
