//! Analysis (rule execution) configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{QueryValue, Severity};

/// Configuration for rule selection and execution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Failed rules at or above this severity are failures. Default: major.
    pub fail_on_severity: Option<Severity>,
    /// Failed rules at or above this severity are logged as warnings. Default: minor.
    pub warn_on_severity: Option<Severity>,
    /// Selected concept ids; `*` and `?` wildcards allowed.
    pub concepts: Vec<String>,
    /// Selected constraint ids; `*` and `?` wildcards allowed.
    pub constraints: Vec<String>,
    /// Selected group ids; `*` and `?` wildcards allowed.
    pub groups: Vec<String>,
    /// Re-run concepts already recorded as applied. Default: false.
    pub execute_applied_concepts: Option<bool>,
    /// Values for rule query parameters, overriding rule-declared defaults.
    pub rule_parameters: BTreeMap<String, QueryValue>,
}

impl AnalyzeConfig {
    pub fn effective_fail_on_severity(&self) -> Severity {
        self.fail_on_severity.unwrap_or(Severity::Major)
    }

    pub fn effective_warn_on_severity(&self) -> Severity {
        self.warn_on_severity.unwrap_or(Severity::Minor)
    }

    pub fn effective_execute_applied_concepts(&self) -> bool {
        self.execute_applied_concepts.unwrap_or(false)
    }

    /// True when no explicit selection was configured (run everything).
    pub fn selects_all(&self) -> bool {
        self.concepts.is_empty() && self.constraints.is_empty() && self.groups.is_empty()
    }
}
