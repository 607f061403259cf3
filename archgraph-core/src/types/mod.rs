//! Core types shared across archgraph crates.

pub mod collections;
pub mod graph;
pub mod severity;

pub use collections::{FxHashMap, FxHashSet};
pub use graph::{NodeId, QueryParameters, QueryResult, QueryValue, Row};
pub use severity::Severity;
