//! Top-level analysis errors.

use super::error_code::ArchgraphErrorCode;
use super::{ConfigError, RuleError, RuleExecutorError, ScanError, StorageError};

/// Errors that can abort a scan-and-analyze run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Rule execution error: {0}")]
    Execution(#[from] RuleExecutorError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ArchgraphErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Rule(e) => e.error_code(),
            Self::Execution(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
