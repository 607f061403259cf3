//! Label membership: a node's growing set of type tags.

use archgraph_core::errors::StorageError;
use archgraph_core::types::NodeId;
use rusqlite::{params, Connection};

use super::nodes::{find_by_label_and_key, node_key};

/// Tag `node` with `label`. Keyed nodes must stay unique per label.
pub fn add_label(conn: &Connection, node: NodeId, label: &str) -> Result<(), StorageError> {
    let key = node_key(conn, node)?;
    if let Some(ref key) = key {
        if let Some(existing) = find_by_label_and_key(conn, label, key)? {
            if existing == node {
                return Ok(());
            }
            return Err(StorageError::DuplicateKey {
                label: label.to_string(),
                key: key.clone(),
            });
        }
    }
    conn.execute(
        "INSERT OR IGNORE INTO node_labels (node_id, label, key) VALUES (?1, ?2, ?3)",
        params![node.0, label, key],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

pub fn labels_of(conn: &Connection, node: NodeId) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT label FROM node_labels WHERE node_id = ?1 ORDER BY label")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![node.0], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<String>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn count_with_label(conn: &Connection, label: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM node_labels WHERE label = ?1",
        params![label],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
