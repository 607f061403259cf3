//! archgraph-storage: SQLite-backed property-graph store.
//!
//! Nodes, labels, properties and relationships live in four tables managed
//! by versioned migrations. Rule queries run as native SQL against them.

pub mod connection;
pub mod migrations;
pub mod provider;
pub mod queries;
pub mod store;

pub use provider::{SharedStore, StoreProvider};
pub use store::{SqliteGraphStore, StoreLocation};
