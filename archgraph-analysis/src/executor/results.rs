//! Analysis outcome handed to report writers.

use std::collections::BTreeMap;

use archgraph_core::types::{Row, Severity};
use serde::Serialize;

use crate::rules::{MissingRules, RuleKind};
use crate::verification::Status;

/// Outcome of one executed rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub kind: RuleKind,
    pub description: String,
    /// Effective severity, after group overrides.
    pub severity: Severity,
    pub status: Status,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule_id: String,
    pub kind: RuleKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub concepts: BTreeMap<String, RuleResult>,
    pub constraints: BTreeMap<String, RuleResult>,
    /// Rules not executed because a required concept did not succeed.
    pub skipped: Vec<SkippedRule>,
    /// Concepts recorded as applied by an earlier run and not re-executed.
    pub already_applied: Vec<String>,
    pub missing: MissingRules,
}

impl AnalysisResults {
    pub fn results(&self) -> impl Iterator<Item = &RuleResult> {
        self.concepts.values().chain(self.constraints.values())
    }

    pub fn failures(&self) -> Vec<&RuleResult> {
        self.results().filter(|r| r.status == Status::Failure).collect()
    }

    pub fn warnings(&self) -> Vec<&RuleResult> {
        self.results().filter(|r| r.status == Status::Warning).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.results().any(|r| r.status == Status::Failure)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
