//! PRAGMA configuration applied to every store connection.
//!
//! WAL mode, NORMAL sync, 64MB page cache, 5s busy_timeout,
//! foreign_keys ON, incremental auto_vacuum, temp_store MEMORY.

use archgraph_core::errors::StorageError;
use rusqlite::Connection;

/// Apply all performance and safety pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })?;

    // auto_vacuum only takes effect before the first table exists or after a VACUUM.
    let current_av: i64 = conn
        .pragma_query_value(None, "auto_vacuum", |row| row.get(0))
        .unwrap_or(0);
    if current_av != 2 {
        conn.execute_batch("PRAGMA auto_vacuum = INCREMENTAL; VACUUM;")
            .map_err(|e| StorageError::SqliteError {
                message: format!("failed to enable incremental auto_vacuum: {e}"),
            })?;
    }

    Ok(())
}

/// Run optimize pragmas before a connection is closed.
pub fn optimize_on_close(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA analysis_limit = 400;
        PRAGMA optimize;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to optimize: {e}"),
    })
}
