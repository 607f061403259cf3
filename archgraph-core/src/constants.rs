//! Shared constants for the archgraph engine.

/// Application version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project-level configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "archgraph.toml";

/// User-level configuration directory, relative to the home directory.
pub const USER_CONFIG_DIR: &str = ".archgraph";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "ARCHGRAPH_LOG";

/// Store URI that selects an in-memory database.
pub const IN_MEMORY_STORE_URI: &str = ":memory:";

/// Label of the nodes recording successfully applied concepts.
pub const CONCEPT_LABEL: &str = "Concept";

/// Separator between a resource and its scope in `include_files` / `include_urls`.
pub const RESOURCE_SCOPE_SEPARATOR: char = ';';
