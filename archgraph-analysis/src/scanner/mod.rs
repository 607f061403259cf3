//! Scanner: plugin dispatch, transactions, and resource iteration.

pub mod artifact;
pub mod context;
pub mod engine;
pub mod plugin;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod task;
pub mod types;

pub use artifact::{ArtifactIter, ArtifactScanner};
pub use context::ScannerContext;
pub use engine::{Scanner, ScannerConfig};
pub use plugin::{ArtifactPluginAdapter, ArtifactScannerPlugin, ScannerPlugin};
pub use registry::PluginRegistry;
pub use resource::{ArchiveEntries, DirectoryEntries, EntrySource, MemoryEntries, ResourceEntry, UrlEntries};
pub use scope::{Scope, ScopeRegistry};
pub use task::{ScanSummary, ScanTask};
pub use types::{Container, FileResource, ItemKind, ScanItem, ScanStats, CONTAINS};
