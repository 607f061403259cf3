//! Trait seams between the analysis engine and its collaborators.

pub mod store;

pub use store::GraphStore;
