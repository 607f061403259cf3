//! Execution of rule queries written in the store's native language (SQL).
//!
//! A query text may hold several `;`-separated statements. They run in
//! order; named parameters (`:name`, `@name`, `$name`) are bound from the
//! supplied map, and the rows of the last statement that declares result
//! columns become the query result. Result column names must be unique.

use archgraph_core::errors::StorageError;
use archgraph_core::types::{QueryParameters, QueryResult, Row};
use rusqlite::types::Value;
use rusqlite::{Batch, Connection, Statement};

use super::util::{from_sql_value, to_sql_value};

pub fn execute_query(
    conn: &Connection,
    query: &str,
    params: &QueryParameters,
) -> Result<QueryResult, StorageError> {
    let in_transaction = !conn.is_autocommit();
    let mut batch = Batch::new(conn, query);
    let mut result = QueryResult::default();

    while let Some(mut stmt) = batch
        .next()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?
    {
        if !stmt.readonly() && !in_transaction {
            return Err(StorageError::NoActiveTransaction);
        }
        bind_named(&mut stmt, params)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        // Rows are keyed by column name, so a repeated name would drop a value.
        if let Some(duplicate) = columns.iter().enumerate().find_map(|(i, c)| columns[..i].contains(c).then_some(c)) {
            return Err(StorageError::SqliteError {
                message: format!("result column '{duplicate}' appears more than once; alias the columns apart"),
            });
        }
        let mut collected = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows
            .next()
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?
        {
            let mut record = Row::new();
            for (idx, column) in columns.iter().enumerate() {
                let value: Value = row
                    .get(idx)
                    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
                record.insert(column.clone(), from_sql_value(value));
            }
            collected.push(record);
        }

        if !columns.is_empty() {
            result = QueryResult::new(columns, collected);
        }
    }

    Ok(result)
}

fn bind_named(stmt: &mut Statement<'_>, params: &QueryParameters) -> Result<(), StorageError> {
    for idx in 1..=stmt.parameter_count() {
        let Some(name) = stmt.parameter_name(idx).map(str::to_string) else {
            return Err(StorageError::SqliteError {
                message: format!("positional parameter ?{idx} is not supported in rule queries"),
            });
        };
        let bare = name.trim_start_matches([':', '@', '$']);
        let value = params.get(bare).ok_or_else(|| StorageError::SqliteError {
            message: format!("missing value for query parameter '{bare}'"),
        })?;
        stmt.raw_bind_parameter(idx, to_sql_value(value))
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    }
    Ok(())
}
