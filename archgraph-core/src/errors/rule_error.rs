//! Rule model errors: reading, building and selecting rule sets.

use super::error_code::{self, ArchgraphErrorCode};

/// Errors that invalidate a rule set before any rule runs.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Duplicate rule id '{id}' ({kind} conflicts with existing {existing})")]
    DuplicateRule {
        id: String,
        kind: &'static str,
        existing: &'static str,
    },

    #[error("Cyclic concept dependency: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("Cannot parse rule source {source_id}: {message}")]
    ParseError { source_id: String, message: String },

    #[error("Cannot read rule source {source_id}: {message}")]
    SourceRead { source_id: String, message: String },

    #[error("No rule reader accepts source {source_id}")]
    NoReaderForSource { source_id: String },

    #[error("Invalid severity '{value}'")]
    InvalidSeverity { value: String },

    #[error("Rule '{rule}' declares an invalid verification: {message}")]
    InvalidVerification { rule: String, message: String },

    #[error("Cannot export rule set: {message}")]
    WriteFailed { message: String },
}

impl ArchgraphErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CyclicDependency { .. } => error_code::RULE_CYCLE,
            _ => error_code::RULE_ERROR,
        }
    }
}
