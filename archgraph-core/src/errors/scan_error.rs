//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, ArchgraphErrorCode};
use super::{ConfigError, StorageError};

/// Errors that can occur while scanning resources into the graph.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot read archive {path}: {message}")]
    ArchiveError { path: String, message: String },

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedUrl { url: String, scheme: String },

    #[error("Cannot parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("No value of type {type_name} in scanner context")]
    MissingContextValue { type_name: &'static str },

    #[error("Plugin '{plugin}' failed on {path}: {message}")]
    PluginFailed {
        plugin: String,
        path: String,
        message: String,
    },

    #[error("No scanner plugin accepts '{path}' (scope '{scope}')")]
    NotAccepted { path: String, scope: String },

    #[error(
        "Unable to scan '{item}' with path '{path}' and scope '{scope}' \
         (continue_on_error={continue_on_error}): {source}"
    )]
    Unrecoverable {
        item: String,
        path: String,
        scope: String,
        continue_on_error: bool,
        source: Box<ScanError>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ArchgraphErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unrecoverable { .. } => error_code::UNRECOVERABLE_SCAN,
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            _ => error_code::SCAN_ERROR,
        }
    }
}
