use archgraph_core::errors::RuleExecutorError;
use archgraph_core::types::{QueryResult, QueryValue};

use super::{min_max_status, Status, VerificationStrategy};
use crate::rules::{ExecutableRule, Verification};

/// Checks one numeric column of every row against the rule's bounds.
///
/// The column defaults to the first result column. Values are truncated to
/// integers. The first row out of bounds fails the whole result.
pub struct AggregationStrategy;

impl VerificationStrategy for AggregationStrategy {
    fn verification_type(&self) -> &'static str { "aggregation" }

    fn verify(
        &self,
        rule: &ExecutableRule,
        verification: &Verification,
        result: &QueryResult,
    ) -> Result<Status, RuleExecutorError> {
        let Verification::Aggregation { column, min, max } = verification else {
            return Err(RuleExecutorError::UnsupportedVerification {
                verification: verification.type_name().to_string(),
            });
        };
        tracing::debug!(rule = %rule.id, "verifying aggregation result");
        let Some(first) = result.columns.first() else {
            return Err(RuleExecutorError::NoColumns);
        };
        let column = match column {
            Some(column) => column,
            None => {
                tracing::debug!(column = %first, "no aggregation column specified, using first column");
                first
            }
        };

        for row in &result.rows {
            let value = match row.get(column) {
                None | Some(QueryValue::Null) => {
                    return Err(RuleExecutorError::ColumnMissing {
                        column: column.clone(),
                    })
                }
                Some(value) => value,
            };
            let Some(value) = value.as_int() else {
                return Err(RuleExecutorError::NonNumericValue {
                    column: column.clone(),
                    value: value.to_string(),
                });
            };
            if min_max_status(rule.kind, value, *min, *max) == Status::Failure {
                return Ok(Status::Failure);
            }
        }
        Ok(Status::Success)
    }
}
