//! Rule source configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Severity;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuleConfig {
    /// Directories searched recursively for `.toml`, `.yaml` and `.yml` rule files.
    pub directories: Vec<PathBuf>,
    /// Severity of concepts that declare none. Default: minor.
    pub default_concept_severity: Option<Severity>,
    /// Severity of constraints that declare none. Default: major.
    pub default_constraint_severity: Option<Severity>,
}

impl RuleConfig {
    pub fn effective_default_concept_severity(&self) -> Severity {
        self.default_concept_severity.unwrap_or(Severity::Minor)
    }

    pub fn effective_default_constraint_severity(&self) -> Severity {
        self.default_constraint_severity.unwrap_or(Severity::Major)
    }
}
