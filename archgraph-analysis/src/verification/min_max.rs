//! Bounds check shared by the row-count and aggregation strategies.

use crate::rules::RuleKind;

use super::Status;

/// `Success` when `value` lies within `[min, max]`.
///
/// Unset bounds default by rule kind: a concept must match at least once
/// (`min = 1`, no maximum), a constraint must not match at all
/// (`max = 0`, no minimum).
pub fn min_max_status(kind: RuleKind, value: i64, min: Option<i64>, max: Option<i64>) -> Status {
    let (min, max) = match kind {
        RuleKind::Concept => (min.or(Some(1)), max),
        RuleKind::Constraint => (min, max.or(Some(0))),
    };
    let below = min.is_some_and(|min| value < min);
    let above = max.is_some_and(|max| value > max);
    if below || above {
        Status::Failure
    } else {
        Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults() {
        assert_eq!(min_max_status(RuleKind::Concept, 0, None, None), Status::Failure);
        assert_eq!(min_max_status(RuleKind::Concept, 7, None, None), Status::Success);
        assert_eq!(min_max_status(RuleKind::Constraint, 0, None, None), Status::Success);
        assert_eq!(min_max_status(RuleKind::Constraint, 1, None, None), Status::Failure);
    }

    #[test]
    fn explicit_bounds_are_inclusive() {
        assert_eq!(min_max_status(RuleKind::Constraint, 10, Some(0), Some(10)), Status::Success);
        assert_eq!(min_max_status(RuleKind::Constraint, 11, Some(0), Some(10)), Status::Failure);
        assert_eq!(min_max_status(RuleKind::Concept, 2, Some(3), None), Status::Failure);
    }
}
