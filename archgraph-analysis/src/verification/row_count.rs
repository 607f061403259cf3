use archgraph_core::errors::RuleExecutorError;
use archgraph_core::types::QueryResult;

use super::{min_max_status, Status, VerificationStrategy};
use crate::rules::{ExecutableRule, Verification};

/// Checks the number of result rows against the rule's bounds.
pub struct RowCountStrategy;

impl VerificationStrategy for RowCountStrategy {
    fn verification_type(&self) -> &'static str { "row_count" }

    fn verify(
        &self,
        rule: &ExecutableRule,
        verification: &Verification,
        result: &QueryResult,
    ) -> Result<Status, RuleExecutorError> {
        let Verification::RowCount { min, max } = verification else {
            return Err(RuleExecutorError::UnsupportedVerification {
                verification: verification.type_name().to_string(),
            });
        };
        let rows = i64::try_from(result.row_count()).unwrap_or(i64::MAX);
        Ok(min_max_status(rule.kind, rows, *min, *max))
    }
}
