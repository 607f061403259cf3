//! Typed, directed relationships between nodes.

use archgraph_core::errors::StorageError;
use archgraph_core::types::NodeId;
use rusqlite::{params, Connection};

pub fn insert_relationship(
    conn: &Connection,
    from: NodeId,
    relation: &str,
    to: NodeId,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO relationships (from_id, type, to_id) VALUES (?1, ?2, ?3)",
        params![from.0, relation, to.0],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::SqliteError {
                message: format!("relationship {from} -[{relation}]-> {to} references a missing node"),
            }
        }
        other => StorageError::SqliteError { message: other.to_string() },
    })?;
    Ok(())
}

/// Targets of outgoing `relation` edges, in insertion order.
pub fn outgoing(
    conn: &Connection,
    from: NodeId,
    relation: &str,
) -> Result<Vec<NodeId>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT to_id FROM relationships WHERE from_id = ?1 AND type = ?2 ORDER BY id",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![from.0, relation], |row| row.get::<_, i64>(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.map(|r| r.map(NodeId))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
