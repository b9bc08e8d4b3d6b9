//! Menu repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{DeleteOutcome, Menu, NewMenu, OrphanPolicy};
use crate::error::DomainError;
use crate::services::CapacityPolicy;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// All menus ordered by display order, then sequence number.
    async fn list(&self) -> Result<Vec<Menu>, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError>;

    /// Inserts the menu with the next sequence number.
    ///
    /// The menu count check, the counter increment and the insert form one
    /// atomic step: concurrent creations never both pass a full capacity.
    async fn create(&self, menu: &NewMenu, capacity: &CapacityPolicy) -> Result<Menu, DomainError>;

    /// Persists name and order. Fails with `MenuNotFound` if the menu is gone.
    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError>;

    /// Removes the menu, handling its child nodes according to `policy`.
    async fn delete(&self, id: &Uuid, policy: OrphanPolicy) -> Result<DeleteOutcome, DomainError>;
}
