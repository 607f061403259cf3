//! Error handling for archgraph.
//! One error enum per subsystem, `thiserror` only.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod rule_error;
pub mod rule_executor_error;
pub mod scan_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use error_code::ArchgraphErrorCode;
pub use rule_error::RuleError;
pub use rule_executor_error::RuleExecutorError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;
