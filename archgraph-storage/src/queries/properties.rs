//! Node properties.

use archgraph_core::errors::StorageError;
use archgraph_core::types::{NodeId, QueryValue};
use rusqlite::types::Value;
use rusqlite::{params, Connection};

use super::util::{from_sql_value, to_sql_value, OptionalExt};

pub fn upsert_property(
    conn: &Connection,
    node: NodeId,
    name: &str,
    value: &QueryValue,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO node_properties (node_id, name, value) VALUES (?1, ?2, ?3)
         ON CONFLICT (node_id, name) DO UPDATE SET value = excluded.value",
        params![node.0, name, to_sql_value(value)],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::NodeNotFound { id: node.0 }
        }
        other => StorageError::SqliteError { message: other.to_string() },
    })?;
    Ok(())
}

pub fn get_property(
    conn: &Connection,
    node: NodeId,
    name: &str,
) -> Result<Option<QueryValue>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT value FROM node_properties WHERE node_id = ?1 AND name = ?2")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let value: Option<Value> = stmt
        .query_row(params![node.0, name], |row| row.get(0))
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(value.map(from_sql_value))
}
