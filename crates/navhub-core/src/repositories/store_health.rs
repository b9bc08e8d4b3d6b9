//! Store liveness probe (port)

use async_trait::async_trait;
use crate::error::DomainError;

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> Result<(), DomainError>;
    fn backend_name(&self) -> &'static str;
}
