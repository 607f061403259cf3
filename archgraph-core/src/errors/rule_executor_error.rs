//! Rule execution errors. Fatal to an analysis run.

use super::error_code::{self, ArchgraphErrorCode};
use super::StorageError;

/// Errors that indicate a defective rule rather than a violation.
#[derive(Debug, thiserror::Error)]
pub enum RuleExecutorError {
    #[error("Cannot execute query for rule '{rule}': {source}")]
    QueryFailed {
        rule: String,
        #[source]
        source: StorageError,
    },

    #[error("Result contains no columns, at least one with a numeric value is expected.")]
    NoColumns,

    #[error("The result does not contain a column '{column}'")]
    ColumnMissing { column: String },

    #[error("The value in column '{column}' must be a numeric value but was '{value}'")]
    NonNumericValue { column: String, value: String },

    #[error("No verification strategy registered for '{verification}'")]
    UnsupportedVerification { verification: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ArchgraphErrorCode for RuleExecutorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::QueryFailed { .. } => error_code::RULE_EXECUTION_ERROR,
            Self::Storage(e) => e.error_code(),
            _ => error_code::VERIFICATION_ERROR,
        }
    }
}
