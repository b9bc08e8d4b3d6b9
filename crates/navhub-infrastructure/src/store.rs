//! Backend selection
//!
//! Wires one storage backend behind every repository port.

use std::sync::Arc;

use anyhow::bail;
use tracing::info;

use navhub_core::repositories::{MenuRepository, NodeRepository, StoreHealth, UserRepository};
use navhub_shared::config::DatabaseSettings;

use crate::database::{connect, PgMenuRepository, PgNodeRepository, PgStoreHealth, PgUserRepository};
use crate::memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres => "postgres",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StoreBackend::Memory),
            "postgres" | "postgresql" => Some(StoreBackend::Postgres),
            _ => None,
        }
    }
}

/// Repository handles sharing one backend.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub nodes: Arc<dyn NodeRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Store {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            menus: store.clone(),
            nodes: store.clone(),
            health: store,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            menus: Arc::new(PgMenuRepository::new(pool.clone())),
            nodes: Arc::new(PgNodeRepository::new(pool.clone())),
            health: Arc::new(PgStoreHealth::new(pool)),
        }
    }
}

pub async fn build_store(settings: &DatabaseSettings) -> anyhow::Result<Store> {
    let Some(backend) = StoreBackend::from_str(&settings.backend) else {
        bail!("unknown database backend: {}", settings.backend);
    };

    let store = match backend {
        StoreBackend::Memory => Store::memory(),
        StoreBackend::Postgres => Store::postgres(connect(settings).await?),
    };

    info!(backend = backend.as_str(), "Store initialized");
    Ok(store)
}
