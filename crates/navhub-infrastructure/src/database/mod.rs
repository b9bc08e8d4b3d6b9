//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;

pub use connection::{connect, create_pool, run_migrations};
pub use postgres::{PgMenuRepository, PgNodeRepository, PgStoreHealth, PgUserRepository};
