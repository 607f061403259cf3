//! Shared helpers for query modules.

use archgraph_core::types::QueryValue;
use rusqlite::types::Value;

/// Extension that turns `QueryReturnedNoRows` into `Ok(None)`.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

pub fn to_sql_value(value: &QueryValue) -> Value {
    match value {
        QueryValue::Null => Value::Null,
        QueryValue::Integer(v) => Value::Integer(*v),
        QueryValue::Real(v) => Value::Real(*v),
        QueryValue::Text(s) => Value::Text(s.clone()),
        QueryValue::Blob(b) => Value::Blob(b.clone()),
    }
}

pub fn from_sql_value(value: Value) -> QueryValue {
    match value {
        Value::Null => QueryValue::Null,
        Value::Integer(v) => QueryValue::Integer(v),
        Value::Real(v) => QueryValue::Real(v),
        Value::Text(s) => QueryValue::Text(s),
        Value::Blob(b) => QueryValue::Blob(b),
    }
}
