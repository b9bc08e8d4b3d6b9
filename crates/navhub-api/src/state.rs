use std::sync::Arc;

use navhub_core::repositories::StoreHealth;
use navhub_core::services::{AuthService, HierarchyService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub hierarchy: Arc<HierarchyService>,
    pub health: Arc<dyn StoreHealth>,
}

impl AppState {
    pub fn new(auth: AuthService, hierarchy: HierarchyService, health: Arc<dyn StoreHealth>) -> Self {
        Self {
            auth: Arc::new(auth),
            hierarchy: Arc::new(hierarchy),
            health,
        }
    }
}
