//! Rule execution: dependency-ordered visiting and the store-backed analyzer.

pub mod analyzer;
pub mod results;
pub mod rule_set_executor;
pub mod visitor;

pub use analyzer::Analyzer;
pub use results::{AnalysisResults, RuleResult, SkippedRule};
pub use rule_set_executor::{RuleSetExecutor, RuleState};
pub use visitor::RuleVisitor;
