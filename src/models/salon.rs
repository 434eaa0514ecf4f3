use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salon {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub address: String,
    pub description: String,
    pub image_url: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub services: Vec<Service>,
    pub created_at: NaiveDateTime,
}

impl Salon {
    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub salon_id: String,
    pub name: String,
    pub price: i64,
    pub duration_minutes: i64,
}

/// Fields a salon owner supplies when publishing a salon.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSalon {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewSalon {
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.name.trim().is_empty() {
            return Err(("name", "salon name is required"));
        }
        if self.address.trim().is_empty() {
            return Err(("address", "salon address is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewService {
    pub name: String,
    pub price: u32,
    pub duration_minutes: u32,
}

impl NewService {
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.name.trim().is_empty() {
            return Err(("name", "service name is required"));
        }
        if self.duration_minutes == 0 {
            return Err(("duration_minutes", "duration must be at least one minute"));
        }
        Ok(())
    }
}
