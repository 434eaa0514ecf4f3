pub mod sqlite;

use async_trait::async_trait;

use crate::db::StoreError;
use crate::models::{NewSalon, NewService, Salon, Service};

/// Salons and the services they offer.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Salons with nested services, best rated first. `search` filters by
    /// a case-insensitive substring of name or address.
    async fn list_salons(&self, search: Option<&str>) -> Result<Vec<Salon>, StoreError>;

    async fn get_salon(&self, id: &str) -> Result<Option<Salon>, StoreError>;

    async fn create_salon(&self, owner_id: &str, fields: NewSalon) -> Result<Salon, StoreError>;

    async fn create_services(
        &self,
        salon_id: &str,
        services: Vec<NewService>,
    ) -> Result<Vec<Service>, StoreError>;
}
