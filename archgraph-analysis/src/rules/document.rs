//! Serialized rule file layout, shared by the readers and the writer.
//!
//! ```toml
//! [[concept]]
//! id = "layer:Api"
//! description = "Labels API modules."
//! query = "..."
//!
//! [[constraint]]
//! id = "layer:ApiMustNotUseStorage"
//! requires_concepts = ["layer:Api"]
//! query = "..."
//!
//! [[group]]
//! id = "default"
//! constraints = ["layer:*", { id = "naming:Tests", severity = "minor" }]
//! ```

use std::collections::{BTreeMap, BTreeSet};

use archgraph_core::types::{QueryValue, Severity};
use serde::{Deserialize, Serialize};

use super::model::{ExecutableRule, Group, ReportHints, RuleKind, RuleSet, RuleSetBuilder, Verification};
use archgraph_core::errors::RuleError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDocument {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<RuleDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<RuleDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<GroupDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_concepts: Vec<String>,
    pub query: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, QueryValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    #[serde(default, skip_serializing_if = "ReportHints::is_empty")]
    pub report: ReportHints,
}

/// A group include: a bare id or an id with a severity override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeDefinition {
    Id(String),
    WithSeverity {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        severity: Option<Severity>,
    },
}

impl IncludeDefinition {
    fn into_entry(self) -> (String, Option<Severity>) {
        match self {
            Self::Id(id) => (id, None),
            Self::WithSeverity { id, severity } => (id, severity),
        }
    }

    fn from_entry((id, severity): (&String, &Option<Severity>)) -> Self {
        match severity {
            None => Self::Id(id.clone()),
            Some(_) => Self::WithSeverity {
                id: id.clone(),
                severity: *severity,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<IncludeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<IncludeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<IncludeDefinition>,
}

fn includes(defs: Vec<IncludeDefinition>) -> BTreeMap<String, Option<Severity>> {
    defs.into_iter().map(IncludeDefinition::into_entry).collect()
}

impl RuleDocument {
    /// Reject values the TOML export cannot represent. Parameter defaults
    /// must be concrete: TOML has no null.
    pub fn check_parameters(&self) -> Result<(), String> {
        for definition in self.concept.iter().chain(&self.constraint) {
            if let Some((name, _)) = definition.parameters.iter().find(|(_, v)| v.is_null()) {
                return Err(format!(
                    "rule '{}': parameter '{name}' has no value",
                    definition.id
                ));
            }
        }
        Ok(())
    }

    /// Add every rule of this document to `builder`.
    pub fn add_to(self, builder: &mut RuleSetBuilder) -> Result<(), RuleError> {
        for (kind, definitions) in [(RuleKind::Concept, self.concept), (RuleKind::Constraint, self.constraint)] {
            for definition in definitions {
                let severity = definition
                    .severity
                    .unwrap_or_else(|| builder.default_severity(kind));
                builder.add_rule(ExecutableRule {
                    id: definition.id,
                    kind,
                    description: definition.description,
                    severity,
                    query: definition.query,
                    requires_concepts: definition.requires_concepts.into_iter().collect::<BTreeSet<_>>(),
                    verification: definition.verification.unwrap_or_default(),
                    parameters: definition.parameters,
                    report: definition.report,
                })?;
            }
        }
        for group in self.group {
            builder.add_group(Group {
                id: group.id,
                description: group.description,
                severity: group.severity,
                concepts: includes(group.concepts),
                constraints: includes(group.constraints),
                groups: includes(group.groups),
            })?;
        }
        Ok(())
    }

    /// The document form of `rule_set`, with every severity made explicit.
    pub fn from_rule_set(rule_set: &RuleSet) -> Self {
        let definition = |rule: &ExecutableRule| RuleDefinition {
            id: rule.id.clone(),
            description: rule.description.clone(),
            severity: Some(rule.severity),
            requires_concepts: rule.requires_concepts.iter().cloned().collect(),
            query: rule.query.clone(),
            parameters: rule.parameters.clone(),
            verification: (!rule.verification.is_default()).then(|| rule.verification.clone()),
            report: rule.report.clone(),
        };
        let include_list = |map: &BTreeMap<String, Option<Severity>>| {
            map.iter().map(IncludeDefinition::from_entry).collect::<Vec<_>>()
        };
        Self {
            concept: rule_set.concepts().map(definition).collect(),
            constraint: rule_set.constraints().map(definition).collect(),
            group: rule_set
                .groups()
                .map(|group| GroupDefinition {
                    id: group.id.clone(),
                    description: group.description.clone(),
                    severity: group.severity,
                    concepts: include_list(&group.concepts),
                    constraints: include_list(&group.constraints),
                    groups: include_list(&group.groups),
                })
                .collect(),
        }
    }
}
