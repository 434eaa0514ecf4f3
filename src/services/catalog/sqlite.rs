use std::time::Duration;

use async_trait::async_trait;

use super::CatalogStore;
use crate::db::{self, queries, Db, StoreError};
use crate::models::{NewSalon, NewService, Salon, Service};

pub struct SqliteCatalog {
    db: Db,
    timeout: Duration,
}

impl SqliteCatalog {
    pub fn new(db: Db, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list_salons(&self, search: Option<&str>) -> Result<Vec<Salon>, StoreError> {
        let search = search.map(str::to_string);
        db::run(&self.db, self.timeout, move |conn| {
            queries::list_salons(conn, search.as_deref())
        })
        .await
    }

    async fn get_salon(&self, id: &str) -> Result<Option<Salon>, StoreError> {
        let id = id.to_string();
        db::run(&self.db, self.timeout, move |conn| queries::get_salon(conn, &id)).await
    }

    async fn create_salon(&self, owner_id: &str, fields: NewSalon) -> Result<Salon, StoreError> {
        let owner_id = owner_id.to_string();
        let salon = db::run(&self.db, self.timeout, move |conn| {
            let now = chrono::Utc::now().naive_utc();
            queries::insert_salon(conn, Some(&owner_id), &fields, &now)
        })
        .await?;

        tracing::info!(salon_id = %salon.id, name = %salon.name, "salon created");
        Ok(salon)
    }

    async fn create_services(
        &self,
        salon_id: &str,
        services: Vec<NewService>,
    ) -> Result<Vec<Service>, StoreError> {
        let salon_id = salon_id.to_string();
        let created = db::run(&self.db, self.timeout, move |conn| {
            let now = chrono::Utc::now().naive_utc();
            queries::insert_services(conn, &salon_id, &services, &now)
        })
        .await?;

        tracing::info!(count = created.len(), "services created");
        Ok(created)
    }
}
