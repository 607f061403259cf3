//! Verification strategies: classify a rule's query result.

pub mod aggregation;
pub mod min_max;
pub mod row_count;

use std::fmt;

use archgraph_core::errors::RuleExecutorError;
use archgraph_core::types::QueryResult;
use serde::{Deserialize, Serialize};

use crate::rules::{ExecutableRule, Verification};

pub use aggregation::AggregationStrategy;
pub use min_max::min_max_status;
pub use row_count::RowCountStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
    Warning,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Warning => "warning",
        })
    }
}

/// Classifies the result of one verification type as success or failure.
pub trait VerificationStrategy {
    /// The `Verification::type_name` this strategy handles.
    fn verification_type(&self) -> &'static str;

    fn verify(
        &self,
        rule: &ExecutableRule,
        verification: &Verification,
        result: &QueryResult,
    ) -> Result<Status, RuleExecutorError>;
}

/// Registered strategies, looked up by the rule's verification type.
pub struct Strategies {
    strategies: Vec<Box<dyn VerificationStrategy>>,
}

impl Default for Strategies {
    fn default() -> Self {
        Self::with_strategies(vec![Box::new(RowCountStrategy), Box::new(AggregationStrategy)])
    }
}

impl Strategies {
    pub fn with_strategies(strategies: Vec<Box<dyn VerificationStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn verify(&self, rule: &ExecutableRule, result: &QueryResult) -> Result<Status, RuleExecutorError> {
        let verification = &rule.verification;
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.verification_type() == verification.type_name())
            .ok_or_else(|| RuleExecutorError::UnsupportedVerification {
                verification: verification.type_name().to_string(),
            })?;
        strategy.verify(rule, verification, result)
    }
}
