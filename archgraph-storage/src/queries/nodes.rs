//! Node identity and key lookups.

use archgraph_core::errors::StorageError;
use archgraph_core::types::NodeId;
use rusqlite::{params, Connection};

use super::util::OptionalExt;

pub fn insert_node(conn: &Connection, key: Option<&str>) -> Result<NodeId, StorageError> {
    conn.execute("INSERT INTO nodes (key) VALUES (?1)", params![key])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(NodeId(conn.last_insert_rowid()))
}

pub fn node_key(conn: &Connection, node: NodeId) -> Result<Option<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT key FROM nodes WHERE id = ?1")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let key: Option<Option<String>> = stmt
        .query_row(params![node.0], |row| row.get(0))
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    key.ok_or(StorageError::NodeNotFound { id: node.0 })
}

pub fn find_by_label_and_key(
    conn: &Connection,
    label: &str,
    key: &str,
) -> Result<Option<NodeId>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT node_id FROM node_labels WHERE label = ?1 AND key = ?2")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let id: Option<i64> = stmt
        .query_row(params![label, key], |row| row.get(0))
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(id.map(NodeId))
}

pub fn count_nodes(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Delete every node and, through cascades, all labels, properties and edges.
pub fn delete_all(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        DELETE FROM relationships;
        DELETE FROM node_properties;
        DELETE FROM node_labels;
        DELETE FROM nodes;
        ",
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
