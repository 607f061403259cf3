//! Scanner configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for the scanner subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Log and skip a resource whose scan fails instead of aborting. Default: false.
    pub continue_on_error: Option<bool>,
    /// Delete all graph content before scanning. Default: false.
    pub reset: Option<bool>,
    /// Files or directories to scan, each `"<path>[;<scope>]"`.
    pub include_files: Vec<String>,
    /// URLs to scan, each `"<url>[;<scope>]"`.
    pub include_urls: Vec<String>,
    /// Glob patterns matched against relative paths; matches are not scanned.
    pub exclude: Vec<String>,
    /// Free-form properties handed to every plugin's `configure`.
    pub properties: BTreeMap<String, String>,
}

impl ScanConfig {
    pub fn effective_continue_on_error(&self) -> bool {
        self.continue_on_error.unwrap_or(false)
    }

    pub fn effective_reset(&self) -> bool {
        self.reset.unwrap_or(false)
    }
}
