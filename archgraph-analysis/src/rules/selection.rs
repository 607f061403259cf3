//! Rule selection: the requested ids and their resolution against a rule set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use archgraph_core::config::AnalyzeConfig;
use archgraph_core::errors::RuleError;
use archgraph_core::types::Severity;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::model::RuleSet;

/// Requested rule ids by kind. Ids may contain `*` and `?` wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    pub concepts: Vec<String>,
    pub constraints: Vec<String>,
    pub groups: Vec<String>,
}

/// Requested ids that matched no rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingRules {
    pub concepts: BTreeSet<String>,
    pub constraints: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

impl MissingRules {
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty() && self.constraints.is_empty() && self.groups.is_empty()
    }
}

/// A selection resolved against a rule set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRules {
    /// Selected concepts plus every concept they, the selected constraints or
    /// the selected groups require, requirements first.
    pub concepts: Vec<String>,
    /// Constraints selected directly, in request order.
    pub constraints: Vec<String>,
    /// Groups selected directly, in request order.
    pub groups: Vec<String>,
    /// Every constraint reachable through a selected group.
    pub group_constraints: BTreeSet<String>,
    /// Severity overrides for concepts included by a group; the first
    /// group to include a concept wins.
    pub concept_severities: BTreeMap<String, Severity>,
    pub missing: MissingRules,
}

fn is_pattern(id: &str) -> bool {
    id.contains(['*', '?'])
}

/// Ids of `ids` matched by `requested`: all matches for a wildcard pattern,
/// otherwise the id itself if present.
pub(crate) fn matching_ids<'a>(requested: &str, ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    if is_pattern(requested) {
        if let Ok(pattern) = glob::Pattern::new(requested) {
            return ids.filter(|id| pattern.matches(id)).cloned().collect();
        }
    }
    ids.filter(|id| *id == requested).cloned().collect()
}

impl RuleSelection {
    /// Every rule of the set.
    pub fn all_of(rule_set: &RuleSet) -> Self {
        Self {
            concepts: rule_set.concept_ids().cloned().collect(),
            constraints: rule_set.constraint_ids().cloned().collect(),
            groups: rule_set.group_ids().cloned().collect(),
        }
    }

    pub fn of(
        concepts: impl IntoIterator<Item = impl Into<String>>,
        constraints: impl IntoIterator<Item = impl Into<String>>,
        groups: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            concepts: concepts.into_iter().map(Into::into).collect(),
            constraints: constraints.into_iter().map(Into::into).collect(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured selection, or every rule when none is configured.
    pub fn from_config(config: &AnalyzeConfig, rule_set: &RuleSet) -> Self {
        if config.selects_all() {
            Self::all_of(rule_set)
        } else {
            Self::of(
                config.concepts.iter().cloned(),
                config.constraints.iter().cloned(),
                config.groups.iter().cloned(),
            )
        }
    }

    /// Resolve against `rule_set`: expand wildcards and groups, close over
    /// required concepts and order concepts by dependency.
    ///
    /// Unknown ids are collected in `missing`, never an error. A concept
    /// that transitively requires itself is `RuleError::CyclicDependency`.
    pub fn resolve(&self, rule_set: &RuleSet) -> Result<ResolvedRules, RuleError> {
        let mut resolved = ResolvedRules::default();
        let mut concepts = BTreeSet::new();

        for requested in &self.concepts {
            let ids = matching_ids(requested, rule_set.concept_ids());
            if ids.is_empty() {
                resolved.missing.concepts.insert(requested.clone());
            }
            concepts.extend(ids);
        }
        for requested in &self.constraints {
            let ids = matching_ids(requested, rule_set.constraint_ids());
            if ids.is_empty() {
                resolved.missing.constraints.insert(requested.clone());
            }
            for id in ids {
                if !resolved.constraints.contains(&id) {
                    resolved.constraints.push(id);
                }
            }
        }
        for requested in &self.groups {
            let ids = matching_ids(requested, rule_set.group_ids());
            if ids.is_empty() {
                resolved.missing.groups.insert(requested.clone());
            }
            for id in ids {
                if !resolved.groups.contains(&id) {
                    resolved.groups.push(id);
                }
            }
        }

        self.expand_groups(rule_set, &mut resolved, &mut concepts);

        let constraint_requirements = resolved
            .constraints
            .iter()
            .chain(&resolved.group_constraints)
            .filter_map(|id| rule_set.constraint(id))
            .flat_map(|c| c.requires_concepts.iter().cloned())
            .collect::<Vec<_>>();
        let mut pending: VecDeque<String> = concepts.iter().cloned().chain(constraint_requirements).collect();
        let mut closure = BTreeSet::new();
        while let Some(id) = pending.pop_front() {
            if closure.contains(&id) {
                continue;
            }
            match rule_set.concept(&id) {
                Some(concept) => {
                    pending.extend(concept.requires_concepts.iter().cloned());
                    closure.insert(id);
                }
                None => {
                    resolved.missing.concepts.insert(id);
                }
            }
        }

        resolved.concepts = dependency_order(rule_set, &closure)?;
        Ok(resolved)
    }

    fn expand_groups(&self, rule_set: &RuleSet, resolved: &mut ResolvedRules, concepts: &mut BTreeSet<String>) {
        let mut visited = BTreeSet::new();
        let mut pending: VecDeque<String> = resolved.groups.iter().cloned().collect();
        while let Some(group_id) = pending.pop_front() {
            if !visited.insert(group_id.clone()) {
                continue;
            }
            let Some(group) = rule_set.group(&group_id) else {
                resolved.missing.groups.insert(group_id);
                continue;
            };
            for (requested, severity) in &group.concepts {
                let ids = matching_ids(requested, rule_set.concept_ids());
                if ids.is_empty() {
                    resolved.missing.concepts.insert(requested.clone());
                }
                for id in ids {
                    if let Some(severity) = severity.or(group.severity) {
                        resolved.concept_severities.entry(id.clone()).or_insert(severity);
                    }
                    concepts.insert(id);
                }
            }
            for requested in group.constraints.keys() {
                let ids = matching_ids(requested, rule_set.constraint_ids());
                if ids.is_empty() {
                    resolved.missing.constraints.insert(requested.clone());
                }
                resolved.group_constraints.extend(ids);
            }
            for requested in group.groups.keys() {
                let ids = matching_ids(requested, rule_set.group_ids());
                if ids.is_empty() {
                    resolved.missing.groups.insert(requested.clone());
                }
                pending.extend(ids);
            }
        }
    }
}

/// `concepts` ordered so that every concept follows the concepts it
/// requires. Requirements outside `concepts` are ignored.
fn dependency_order(rule_set: &RuleSet, concepts: &BTreeSet<String>) -> Result<Vec<String>, RuleError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let index: BTreeMap<&str, NodeIndex> = concepts
        .iter()
        .map(|id| (id.as_str(), graph.add_node(id.as_str())))
        .collect();
    for id in concepts {
        let Some(concept) = rule_set.concept(id) else {
            continue;
        };
        for required in &concept.requires_concepts {
            if let (Some(&from), Some(&to)) = (index.get(required.as_str()), index.get(id.as_str())) {
                graph.add_edge(from, to, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|n| graph[n].to_string()).collect()),
        Err(cycle) => {
            let start = cycle.node_id();
            let mut path: Vec<String> = tarjan_scc(&graph)
                .into_iter()
                .find(|component| component.contains(&start))
                .unwrap_or_else(|| vec![start])
                .into_iter()
                .map(|n| graph[n].to_string())
                .collect();
            path.sort();
            if let Some(first) = path.first().cloned() {
                path.push(first);
            }
            Err(RuleError::CyclicDependency { path })
        }
    }
}
