//! `SQLite` database utilities for the case store.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` so a second reader (for example `casegraph list`
//!   while the TUI is open) does not block on the writer
//! - `busy_timeout = 5s` to ride out that reader's short locks
//! - `foreign_keys = ON`

pub mod migrations;
pub mod schema;

use crate::error::CaseError;
use rusqlite::Connection;
use std::{path::Path, time::Duration};
use tracing::instrument;

/// Busy timeout used for case store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the case database, apply runtime pragmas, and migrate the
/// schema to the latest version.
///
/// # Errors
///
/// Returns [`CaseError::StoreDirectory`] if the parent directory cannot be
/// created and [`CaseError::StorageUnavailable`] if opening, configuring or
/// migrating the database fails.
#[instrument]
pub fn open_store_db(path: &Path) -> Result<Connection, CaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CaseError::StoreDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let unavailable = |source| CaseError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut conn = Connection::open(path).map_err(unavailable)?;
    configure_connection(&conn).map_err(unavailable)?;
    let version = migrations::migrate(&mut conn).map_err(unavailable)?;
    tracing::debug!(path = %path.display(), schema_version = version, "opened case store");

    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}
