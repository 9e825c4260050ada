use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{LibraryError, Result};

/// Schema version written to `PRAGMA user_version`. There is no migration
/// path; a newer file is refused rather than guessed at.
pub const SCHEMA_VERSION: i64 = 1;

/// Open (or create) the database file at `path` and make sure the schema
/// exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "opened song library");
    Ok(conn)
}

/// In-memory database with the same schema, used by tests and throwaway
/// sessions.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `songs` table on a fresh database and check the recorded
/// schema version on an existing one.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version > SCHEMA_VERSION {
        return Err(LibraryError::SchemaVersion {
            found: version,
            expected: SCHEMA_VERSION,
        });
    }

    // AUTOINCREMENT keeps ids monotonic even after the highest row is deleted.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            audio_type TEXT NOT NULL,
            audio_data BLOB NOT NULL,
            image_type TEXT,
            image_data BLOB,
            added_date TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS songs_name ON songs (name)",
        [],
    )?;

    if version < SCHEMA_VERSION {
        debug!(from = version, to = SCHEMA_VERSION, "stamping schema version");
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
