//! Dependency-ordered execution of a rule selection.

use std::collections::{BTreeMap, BTreeSet};

use archgraph_core::types::Severity;
use serde::Serialize;

use super::visitor::RuleVisitor;
use crate::rules::selection::matching_ids;
use crate::rules::{Concept, Constraint, ExecutableRule, Group, ResolvedRules, RuleSelection, RuleSet};

/// Lifecycle of one selected rule during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleState {
    Pending,
    Executing,
    Succeeded,
    Failed,
    /// Not executed because a required concept did not succeed.
    Skipped,
}

/// Drives a `RuleVisitor` through a resolved selection.
///
/// Concepts run first in dependency order; a concept or constraint whose
/// required concepts have not all succeeded is skipped. Selected groups run
/// next, validating their constraints with the group's severity, followed
/// by the directly selected constraints. Each rule is visited at most once.
pub struct RuleSetExecutor<'v, V: RuleVisitor> {
    visitor: &'v mut V,
    concepts: BTreeMap<String, RuleState>,
    constraints: BTreeMap<String, RuleState>,
    executed_groups: BTreeSet<String>,
}

impl<'v, V: RuleVisitor> RuleSetExecutor<'v, V> {
    pub fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            concepts: BTreeMap::new(),
            constraints: BTreeMap::new(),
            executed_groups: BTreeSet::new(),
        }
    }

    pub fn concept_state(&self, id: &str) -> Option<RuleState> {
        self.concepts.get(id).copied()
    }

    pub fn constraint_state(&self, id: &str) -> Option<RuleState> {
        self.constraints.get(id).copied()
    }

    /// Resolve `selection` and visit its rules. Missing ids are reported to
    /// the visitor before any rule runs. The first visitor error aborts
    /// the run.
    pub fn execute(&mut self, rule_set: &RuleSet, selection: &RuleSelection) -> Result<ResolvedRules, V::Error> {
        let resolved = selection.resolve(rule_set)?;
        for id in &resolved.concepts {
            self.concepts.insert(id.clone(), RuleState::Pending);
        }
        for id in resolved.constraints.iter().chain(&resolved.group_constraints) {
            self.constraints.insert(id.clone(), RuleState::Pending);
        }

        self.visitor.before_rules()?;
        for id in &resolved.missing.concepts {
            self.visitor.missing_concept(id)?;
        }
        for id in &resolved.missing.constraints {
            self.visitor.missing_constraint(id)?;
        }
        for id in &resolved.missing.groups {
            self.visitor.missing_group(id)?;
        }

        for id in &resolved.concepts {
            let Some(concept) = rule_set.concept(id) else {
                continue;
            };
            let severity = resolved.concept_severities.get(id).copied().unwrap_or(concept.severity);
            self.apply_concept(concept, severity)?;
        }
        for id in &resolved.groups {
            if let Some(group) = rule_set.group(id) {
                self.execute_group(rule_set, group, group.severity)?;
            }
        }
        for id in &resolved.constraints {
            if let Some(constraint) = rule_set.constraint(id) {
                self.validate_constraint(constraint, constraint.severity)?;
            }
        }
        self.visitor.after_rules()?;
        Ok(resolved)
    }

    fn requirements_met(&self, rule: &ExecutableRule) -> bool {
        rule.requires_concepts
            .iter()
            .all(|id| self.concepts.get(id) == Some(&RuleState::Succeeded))
    }

    fn apply_concept(&mut self, concept: &Concept, severity: Severity) -> Result<(), V::Error> {
        if self.concepts.get(&concept.id) != Some(&RuleState::Pending) {
            return Ok(());
        }
        if !self.requirements_met(concept) {
            tracing::debug!(concept = %concept.id, "required concepts not satisfied, skipping");
            self.concepts.insert(concept.id.clone(), RuleState::Skipped);
            return self.visitor.skip_concept(concept, severity);
        }
        self.concepts.insert(concept.id.clone(), RuleState::Executing);
        let satisfied = self.visitor.visit_concept(concept, severity)?;
        let state = if satisfied { RuleState::Succeeded } else { RuleState::Failed };
        self.concepts.insert(concept.id.clone(), state);
        Ok(())
    }

    fn validate_constraint(&mut self, constraint: &Constraint, severity: Severity) -> Result<(), V::Error> {
        if !matches!(self.constraints.get(&constraint.id), None | Some(RuleState::Pending)) {
            return Ok(());
        }
        if !self.requirements_met(constraint) {
            tracing::debug!(constraint = %constraint.id, "required concepts not satisfied, skipping");
            self.constraints.insert(constraint.id.clone(), RuleState::Skipped);
            return self.visitor.skip_constraint(constraint, severity);
        }
        self.constraints.insert(constraint.id.clone(), RuleState::Executing);
        let passed = self.visitor.visit_constraint(constraint, severity)?;
        let state = if passed { RuleState::Succeeded } else { RuleState::Failed };
        self.constraints.insert(constraint.id.clone(), state);
        Ok(())
    }

    fn execute_group(&mut self, rule_set: &RuleSet, group: &Group, severity: Option<Severity>) -> Result<(), V::Error> {
        if !self.executed_groups.insert(group.id.clone()) {
            return Ok(());
        }
        self.visitor.before_group(group, severity)?;
        for (requested, include_severity) in &group.constraints {
            for id in matching_ids(requested, rule_set.constraint_ids()) {
                if let Some(constraint) = rule_set.constraint(&id) {
                    let effective = include_severity.or(severity).unwrap_or(constraint.severity);
                    self.validate_constraint(constraint, effective)?;
                }
            }
        }
        for (requested, include_severity) in &group.groups {
            for id in matching_ids(requested, rule_set.group_ids()) {
                if let Some(nested) = rule_set.group(&id) {
                    let effective = include_severity.or(nested.severity).or(severity);
                    self.execute_group(rule_set, nested, effective)?;
                }
            }
        }
        self.visitor.after_group(group)
    }
}
