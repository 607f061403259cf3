//! In-memory rule model: executable rules, groups and the rule set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use archgraph_core::config::RuleConfig;
use archgraph_core::errors::RuleError;
use archgraph_core::types::{QueryValue, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Concept,
    Constraint,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Constraint => "constraint",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a rule's query result is classified.
///
/// Bounds left unset take the kind's default: concepts need at least one
/// row (`min = 1`), constraints allow none (`max = 0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verification {
    RowCount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Checks a numeric column of every row against the bounds.
    Aggregation {
        /// Defaults to the first result column.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
}

impl Verification {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RowCount { .. } => "row_count",
            Self::Aggregation { .. } => "aggregation",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for Verification {
    fn default() -> Self {
        Self::RowCount { min: None, max: None }
    }
}

/// Presentation hints for report writers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHints {
    /// Column identifying the element a row is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_column: Option<String>,
}

impl ReportHints {
    pub fn is_empty(&self) -> bool {
        self.primary_column.is_none()
    }
}

/// A concept or constraint: a query plus the verification of its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutableRule {
    pub id: String,
    pub kind: RuleKind,
    pub description: String,
    pub severity: Severity,
    pub query: String,
    pub requires_concepts: BTreeSet<String>,
    pub verification: Verification,
    /// Query parameter defaults; configured rule parameters take precedence.
    pub parameters: BTreeMap<String, QueryValue>,
    pub report: ReportHints,
}

pub type Concept = ExecutableRule;
pub type Constraint = ExecutableRule;

/// A named collection of rules, each optionally with a severity override.
/// Includes may use `*` and `?` wildcards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Group {
    pub id: String,
    pub description: String,
    /// Applied to included rules without their own override.
    pub severity: Option<Severity>,
    pub concepts: BTreeMap<String, Option<Severity>>,
    pub constraints: BTreeMap<String, Option<Severity>>,
    pub groups: BTreeMap<String, Option<Severity>>,
}

/// All known rules keyed by id. Ids are unique across all three kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    concepts: BTreeMap<String, Concept>,
    constraints: BTreeMap<String, Constraint>,
    groups: BTreeMap<String, Group>,
}

impl RuleSet {
    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn concept_ids(&self) -> impl Iterator<Item = &String> {
        self.concepts.keys()
    }

    pub fn constraint_ids(&self) -> impl Iterator<Item = &String> {
        self.constraints.keys()
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.concepts.len() + self.constraints.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind_of(&self, id: &str) -> Option<&'static str> {
        if self.concepts.contains_key(id) {
            Some("concept")
        } else if self.constraints.contains_key(id) {
            Some("constraint")
        } else if self.groups.contains_key(id) {
            Some("group")
        } else {
            None
        }
    }
}

/// Collects rules from any number of sources into one `RuleSet`,
/// rejecting duplicate ids.
#[derive(Debug)]
pub struct RuleSetBuilder {
    rule_set: RuleSet,
    concept_severity: Severity,
    constraint_severity: Severity,
}

impl RuleSetBuilder {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            rule_set: RuleSet::default(),
            concept_severity: config.effective_default_concept_severity(),
            constraint_severity: config.effective_default_constraint_severity(),
        }
    }

    /// Severity for a rule of `kind` that declares none.
    pub fn default_severity(&self, kind: RuleKind) -> Severity {
        match kind {
            RuleKind::Concept => self.concept_severity,
            RuleKind::Constraint => self.constraint_severity,
        }
    }

    fn check_unique(&self, id: &str, kind: &'static str) -> Result<(), RuleError> {
        match self.rule_set.kind_of(id) {
            Some(existing) => Err(RuleError::DuplicateRule {
                id: id.to_string(),
                kind,
                existing,
            }),
            None => Ok(()),
        }
    }

    pub fn add_rule(&mut self, rule: ExecutableRule) -> Result<&mut Self, RuleError> {
        self.check_unique(&rule.id, rule.kind.name())?;
        let rules = match rule.kind {
            RuleKind::Concept => &mut self.rule_set.concepts,
            RuleKind::Constraint => &mut self.rule_set.constraints,
        };
        rules.insert(rule.id.clone(), rule);
        Ok(self)
    }

    pub fn add_group(&mut self, group: Group) -> Result<&mut Self, RuleError> {
        self.check_unique(&group.id, "group")?;
        self.rule_set.groups.insert(group.id.clone(), group);
        Ok(self)
    }

    pub fn build(self) -> RuleSet {
        self.rule_set
    }
}
