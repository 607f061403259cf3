//! Graph store configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::IN_MEMORY_STORE_URI;
use crate::errors::ConfigError;

/// How long a cached store stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreLifecycle {
    /// Stopped as soon as its last user releases it.
    Module,
    /// Kept open for the whole process until explicitly closed.
    #[default]
    Reactor,
}

impl fmt::Display for StoreLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => f.write_str("module"),
            Self::Reactor => f.write_str("reactor"),
        }
    }
}

impl FromStr for StoreLifecycle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "module" => Ok(Self::Module),
            "reactor" => Ok(Self::Reactor),
            other => Err(ConfigError::InvalidValue {
                field: "store.lifecycle".to_string(),
                message: format!("expected 'module' or 'reactor', got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Absent or `:memory:` selects an in-memory store.
    pub uri: Option<String>,
    pub lifecycle: Option<StoreLifecycle>,
    /// Reset the store when it is first opened. Default: false.
    pub reset_on_start: Option<bool>,
}

impl StoreConfig {
    pub fn effective_uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(IN_MEMORY_STORE_URI)
    }

    pub fn effective_lifecycle(&self) -> StoreLifecycle {
        self.lifecycle.unwrap_or_default()
    }

    pub fn effective_reset_on_start(&self) -> bool {
        self.reset_on_start.unwrap_or(false)
    }

    pub fn is_in_memory(&self) -> bool {
        self.effective_uri() == IN_MEMORY_STORE_URI
    }
}
