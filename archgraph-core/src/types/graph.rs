//! Property-graph value types exchanged with a `GraphStore`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identity of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single value in a node property or a query result cell.
///
/// SQLite has no boolean type; booleans read from rule or config files
/// become `Integer(0)` / `Integer(1)`, as `From<bool>` does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "SourceValue")]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Everything a serialized `QueryValue` may be written as.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<SourceValue> for QueryValue {
    fn from(value: SourceValue) -> Self {
        match value {
            SourceValue::Null => Self::Null,
            SourceValue::Boolean(v) => v.into(),
            SourceValue::Integer(v) => Self::Integer(v),
            SourceValue::Real(v) => Self::Real(v),
            SourceValue::Text(v) => Self::Text(v),
            SourceValue::Blob(v) => Self::Blob(v),
        }
    }
}

impl QueryValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Truncating integer conversion of a numeric value.
    /// Reals are truncated towards zero, not rounded.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Real(v) => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One result row: column name to value.
pub type Row = BTreeMap<String, QueryValue>;

/// Named parameters bound into a query.
pub type QueryParameters = BTreeMap<String, QueryValue>;

/// Tabular result of a store query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in the order the query declared them.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// All values of one column, `Null` where a row lacks it.
    pub fn column(&self, name: &str) -> Vec<QueryValue> {
        self.rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(QueryValue::Null))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
