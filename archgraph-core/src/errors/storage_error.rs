//! Graph store errors.

use super::error_code::{self, ArchgraphErrorCode};

/// Errors raised by a graph store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Store has not been started")]
    NotStarted,

    #[error("No active transaction")]
    NoActiveTransaction,

    #[error("A transaction is already active")]
    TransactionAlreadyActive,

    #[error("Node with label '{label}' and key '{key}' already exists")]
    DuplicateKey { label: String, key: String },

    #[error("Node {id} not found")]
    NodeNotFound { id: i64 },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl ArchgraphErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::NoActiveTransaction | Self::TransactionAlreadyActive => {
                error_code::TRANSACTION_ERROR
            }
            _ => error_code::STORAGE_ERROR,
        }
    }
}
