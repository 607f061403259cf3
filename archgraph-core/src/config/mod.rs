//! Configuration system for archgraph.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod analyze_config;
pub mod archgraph_config;
pub mod rule_config;
pub mod scan_config;
pub mod store_config;

pub use analyze_config::AnalyzeConfig;
pub use archgraph_config::{ArchgraphConfig, CliOverrides};
pub use rule_config::RuleConfig;
pub use scan_config::ScanConfig;
pub use store_config::{StoreConfig, StoreLifecycle};
