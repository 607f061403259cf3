//! ArchgraphErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable, machine-readable
/// code alongside its human-readable message.
pub trait ArchgraphErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const TRANSACTION_ERROR: &str = "TRANSACTION_ERROR";
pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const UNRECOVERABLE_SCAN: &str = "UNRECOVERABLE_SCAN";
pub const RULE_ERROR: &str = "RULE_ERROR";
pub const RULE_CYCLE: &str = "RULE_CYCLE";
pub const RULE_EXECUTION_ERROR: &str = "RULE_EXECUTION_ERROR";
pub const VERIFICATION_ERROR: &str = "VERIFICATION_ERROR";
