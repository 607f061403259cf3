//! Explicit transaction control on a single connection.

use archgraph_core::errors::StorageError;
use rusqlite::Connection;

/// Start a write transaction. BEGIN IMMEDIATE takes the write lock up front.
pub fn begin_immediate(conn: &Connection) -> Result<(), StorageError> {
    if !conn.is_autocommit() {
        return Err(StorageError::TransactionAlreadyActive);
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })
}

pub fn commit(conn: &Connection) -> Result<(), StorageError> {
    if conn.is_autocommit() {
        return Err(StorageError::NoActiveTransaction);
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to commit: {e}"),
        })
}

pub fn rollback(conn: &Connection) -> Result<(), StorageError> {
    if conn.is_autocommit() {
        return Err(StorageError::NoActiveTransaction);
    }
    conn.execute_batch("ROLLBACK")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to roll back: {e}"),
        })
}

fn savepoint_name(name: &str) -> Result<&str, StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(StorageError::SqliteError {
            message: format!("invalid savepoint name '{name}'"),
        })
    }
}

/// Open a savepoint inside the active transaction.
pub fn savepoint(conn: &Connection, name: &str) -> Result<(), StorageError> {
    let name = savepoint_name(name)?;
    if conn.is_autocommit() {
        return Err(StorageError::NoActiveTransaction);
    }
    conn.execute_batch(&format!("SAVEPOINT {name}"))
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to open savepoint {name}: {e}"),
        })
}

pub fn release_savepoint(conn: &Connection, name: &str) -> Result<(), StorageError> {
    let name = savepoint_name(name)?;
    conn.execute_batch(&format!("RELEASE SAVEPOINT {name}"))
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to release savepoint {name}: {e}"),
        })
}

/// ROLLBACK TO keeps the savepoint on the stack, so it is released afterwards.
pub fn rollback_to_savepoint(conn: &Connection, name: &str) -> Result<(), StorageError> {
    let name = savepoint_name(name)?;
    conn.execute_batch(&format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}"))
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to roll back to savepoint {name}: {e}"),
        })
}

/// Execute `f` inside a BEGIN IMMEDIATE transaction, committing on success.
/// The transaction is rolled back if `f` fails.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Connection) -> Result<T, StorageError>,
{
    begin_immediate(conn)?;
    match f(conn) {
        Ok(result) => {
            commit(conn)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = rollback(conn) {
                tracing::warn!(error = %rollback_err, "rollback after failed write failed");
            }
            Err(e)
        }
    }
}
