//! archgraph-core: shared foundation for the archgraph analysis engine.
//!
//! Errors, configuration, tracing setup, constants, graph value types,
//! and the `GraphStore` trait every store backend implements.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;
