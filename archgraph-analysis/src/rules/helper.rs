//! Listing the rules a selection resolves to.

use std::collections::BTreeSet;

use archgraph_core::errors::RuleError;
use archgraph_core::types::Severity;

use super::model::{Concept, Constraint, Group, RuleSet};
use super::selection::RuleSelection;
use crate::executor::{RuleSetExecutor, RuleVisitor};

const LOG_LINE_PREFIX: &str = "  \"";

/// Collects the rules a selection would execute, without running queries.
#[derive(Debug, Default)]
pub struct CollectRulesVisitor {
    pub concepts: Vec<(String, String)>,
    pub constraints: Vec<(String, String)>,
    pub groups: Vec<String>,
    pub missing_concepts: BTreeSet<String>,
    pub missing_constraints: BTreeSet<String>,
    pub missing_groups: BTreeSet<String>,
}

impl CollectRulesVisitor {
    pub fn has_missing(&self) -> bool {
        !(self.missing_concepts.is_empty() && self.missing_constraints.is_empty() && self.missing_groups.is_empty())
    }
}

impl RuleVisitor for CollectRulesVisitor {
    type Error = RuleError;

    fn before_group(&mut self, group: &Group, _severity: Option<Severity>) -> Result<(), RuleError> {
        self.groups.push(group.id.clone());
        Ok(())
    }

    fn visit_concept(&mut self, concept: &Concept, _severity: Severity) -> Result<bool, RuleError> {
        self.concepts.push((concept.id.clone(), concept.description.clone()));
        Ok(true)
    }

    fn skip_concept(&mut self, concept: &Concept, _severity: Severity) -> Result<(), RuleError> {
        self.concepts.push((concept.id.clone(), concept.description.clone()));
        Ok(())
    }

    fn visit_constraint(&mut self, constraint: &Constraint, _severity: Severity) -> Result<bool, RuleError> {
        self.constraints.push((constraint.id.clone(), constraint.description.clone()));
        Ok(true)
    }

    fn skip_constraint(&mut self, constraint: &Constraint, _severity: Severity) -> Result<(), RuleError> {
        self.constraints.push((constraint.id.clone(), constraint.description.clone()));
        Ok(())
    }

    fn missing_concept(&mut self, id: &str) -> Result<(), RuleError> {
        self.missing_concepts.insert(id.to_string());
        Ok(())
    }

    fn missing_constraint(&mut self, id: &str) -> Result<(), RuleError> {
        self.missing_constraints.insert(id.to_string());
        Ok(())
    }

    fn missing_group(&mut self, id: &str) -> Result<(), RuleError> {
        self.missing_groups.insert(id.to_string());
        Ok(())
    }
}

pub struct RuleHelper;

impl RuleHelper {
    /// Collect the rules `selection` resolves to.
    pub fn collect(rule_set: &RuleSet, selection: &RuleSelection) -> Result<CollectRulesVisitor, RuleError> {
        let mut visitor = CollectRulesVisitor::default();
        RuleSetExecutor::new(&mut visitor).execute(rule_set, selection)?;
        Ok(visitor)
    }

    /// Log the rules of `selection` at info level and missing ids at warn
    /// level. Returns false when ids are missing.
    pub fn print_rule_set(rule_set: &RuleSet, selection: &RuleSelection) -> Result<bool, RuleError> {
        let visitor = Self::collect(rule_set, selection)?;

        tracing::info!("Groups [{}]", visitor.groups.len());
        for id in &visitor.groups {
            tracing::info!("{LOG_LINE_PREFIX}{id}\"");
        }
        tracing::info!("Constraints [{}]", visitor.constraints.len());
        for (id, description) in &visitor.constraints {
            tracing::info!("{LOG_LINE_PREFIX}{id}\" - {description}");
        }
        tracing::info!("Concepts [{}]", visitor.concepts.len());
        for (id, description) in &visitor.concepts {
            tracing::info!("{LOG_LINE_PREFIX}{id}\" - {description}");
        }

        for (kind, missing) in [
            ("concepts", &visitor.missing_concepts),
            ("constraints", &visitor.missing_constraints),
            ("groups", &visitor.missing_groups),
        ] {
            if missing.is_empty() {
                continue;
            }
            tracing::info!("Missing {kind} [{}]", missing.len());
            for id in missing {
                tracing::warn!("{LOG_LINE_PREFIX}{id}");
            }
        }
        Ok(!visitor.has_missing())
    }

    /// Log every rule of the set.
    pub fn print_all(rule_set: &RuleSet) -> Result<bool, RuleError> {
        Self::print_rule_set(rule_set, &RuleSelection::all_of(rule_set))
    }
}
