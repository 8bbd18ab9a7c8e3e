//! Connection bootstrap
//!
//! Every connection handed to the store has foreign keys enabled, a busy
//! timeout so concurrent writers queue instead of failing at once, and
//! the schema applied.

use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use tracing::{debug, error};

use crate::storage::error::StoreResult;
use crate::storage::schema::{init_schema, needs_init};

/// How long a writer waits on a locked database before giving up
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) a database file
pub fn open_file(path: &Path) -> StoreResult<Connection> {
    let started = Instant::now();
    let mut conn = Connection::open(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to open database");
        e
    })?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // WAL lets readers proceed while one writer holds the lock
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    bootstrap(&mut conn)?;
    debug!(
        path = %path.display(),
        duration_ms = started.elapsed().as_millis() as u64,
        "opened database"
    );
    Ok(conn)
}

/// Open a private in-memory database
pub fn open_in_memory() -> StoreResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap(&mut conn)?;
    Ok(conn)
}

fn bootstrap(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if needs_init(conn) {
        init_schema(conn)?;
    }
    Ok(())
}
