use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;

use crate::db::{self, queries, Db, StoreError};
use crate::models::booking::{parse_date, parse_time};
use crate::models::{Booking, BookingEvent, BookingRequest, BookingStatus, Slot};
use crate::services::catalog::CatalogStore;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("slot already booked: {slot}")]
    Conflict { slot: Slot },

    #[error("temporarily unavailable, retry: {0}")]
    Transient(String),
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::Transient(e.to_string())
    }
}

/// Owns booking records and guarantees at most one confirmed booking per
/// slot.
pub struct BookingLedger {
    db: Db,
    catalog: Arc<dyn CatalogStore>,
    events: broadcast::Sender<BookingEvent>,
    timeout: Duration,
}

impl BookingLedger {
    pub fn new(
        db: Db,
        catalog: Arc<dyn CatalogStore>,
        events: broadcast::Sender<BookingEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            db,
            catalog,
            events,
            timeout,
        }
    }

    pub async fn create_booking(
        &self,
        user_id: &str,
        request: &BookingRequest,
    ) -> Result<Booking, LedgerError> {
        let salon_id = request.salon_id.trim();
        let service_id = request.service_id.trim();

        let salon = self
            .catalog
            .get_salon(salon_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound {
                entity: "salon",
                id: salon_id.to_string(),
            })?;

        if salon.service(service_id).is_none() {
            return Err(LedgerError::NotFound {
                entity: "service",
                id: service_id.to_string(),
            });
        }

        let uid = user_id.to_string();
        let user = db::run(&self.db, self.timeout, move |conn| queries::get_user(conn, &uid)).await?;
        if user.is_none() {
            return Err(LedgerError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            });
        }

        let date = parse_date(&request.date).map_err(|message| LedgerError::Validation {
            field: "date",
            message: message.to_string(),
        })?;
        let time = parse_time(&request.time).map_err(|message| LedgerError::Validation {
            field: "time",
            message: message.to_string(),
        })?;

        let today = today();
        if date < today {
            return Err(LedgerError::Validation {
                field: "date",
                message: format!("{date} is before today ({today})"),
            });
        }

        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            salon_id: salon.id.clone(),
            service_id: service_id.to_string(),
            user_id: user_id.to_string(),
            date,
            time,
            status: BookingStatus::Confirmed,
            created_at: Utc::now().naive_utc(),
        };

        // The unique index on confirmed slots is the availability check.
        let row = booking.clone();
        let outcome = db::run(&self.db, self.timeout, move |conn| queries::insert_booking(conn, &row))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, salon_id = %booking.salon_id, "booking insert did not complete");
                LedgerError::from(e)
            })?;

        if let queries::InsertOutcome::SlotTaken = outcome {
            let slot = booking.slot();
            tracing::info!(user_id = %user_id, slot = %slot, "slot already booked");
            return Err(LedgerError::Conflict { slot });
        }

        tracing::info!(
            booking_id = %booking.id,
            salon_id = %booking.salon_id,
            service_id = %booking.service_id,
            user_id = %booking.user_id,
            "booking confirmed"
        );

        // No subscribers is fine.
        let _ = self.events.send(BookingEvent::created(booking.clone()));

        Ok(booking)
    }

    /// Bookings owned by `user_id`, ordered by date, time, then creation.
    pub async fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, LedgerError> {
        let user_id = user_id.to_string();
        let bookings = db::run(&self.db, self.timeout, move |conn| {
            queries::get_bookings_for_user(conn, &user_id)
        })
        .await?;
        Ok(bookings)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
