pub mod migrations;
pub mod queries;
pub mod seed;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use rusqlite::{Connection, ErrorCode};

pub type Db = Arc<Mutex<Connection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage call timed out after {0:?}")]
    TimedOut(Duration),

    #[error("database is busy")]
    Busy,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Runs `f` against the shared connection on the blocking pool, bounded by
/// `timeout`. The write commits even if the caller stops waiting.
pub async fn run<T, F>(db: &Db, timeout: Duration, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    let task = tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection mutex poisoned"))?;
        f(&conn)
    });

    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(StoreError::TimedOut(timeout)),
        Ok(Err(join_err)) => Err(StoreError::Failed(
            anyhow::Error::new(join_err).context("storage task failed"),
        )),
        Ok(Ok(Err(e))) if is_busy(&e) => Err(StoreError::Busy),
        Ok(Ok(result)) => result.map_err(StoreError::Failed),
    }
}

fn is_busy(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}
