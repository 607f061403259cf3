//! archgraph-analysis: scanning artifacts into a graph and evaluating
//! architecture rules against it.
//!
//! - `scanner`: plugin registry, scanner engine, resource iteration
//! - `plugins`: built-in scanner plugins (directories, archives, URLs, documents)
//! - `rules`: rule model, readers, selection and export
//! - `verification`: strategies classifying query results
//! - `executor`: dependency-ordered rule execution and the analyzer
//! - `pipeline`: configuration-driven scan-then-analyze runs

pub mod executor;
pub mod pipeline;
pub mod plugins;
pub mod rules;
pub mod scanner;
pub mod verification;
