use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::db::Db;
use crate::services::catalog::sqlite::SqliteCatalog;
use crate::services::catalog::CatalogStore;
use crate::services::identity::{IdentityVerifier, OtpProvider};
use crate::services::ledger::BookingLedger;
use crate::services::session::SessionKeys;

pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
    pub identity: IdentityVerifier,
    pub catalog: Arc<dyn CatalogStore>,
    pub ledger: BookingLedger,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(config: AppConfig, conn: Connection, otp: Box<dyn OtpProvider>) -> Arc<Self> {
        let db: Db = Arc::new(Mutex::new(conn));
        let timeout = config.collaborator_timeout();
        let (booking_tx, _) = broadcast::channel(256);

        let catalog: Arc<dyn CatalogStore> = Arc::new(SqliteCatalog::new(db.clone(), timeout));
        let ledger = BookingLedger::new(db.clone(), catalog.clone(), booking_tx, timeout);
        let identity = IdentityVerifier::new(otp, db.clone(), timeout);
        let sessions = SessionKeys::new(&config.session_secret, config.session_ttl_hours);

        Arc::new(AppState {
            db,
            config,
            identity,
            catalog,
            ledger,
            sessions,
        })
    }
}
