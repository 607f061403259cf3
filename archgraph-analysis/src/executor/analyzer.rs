//! The analyzer: executes rules against the graph store and verifies results.

use archgraph_core::config::AnalyzeConfig;
use archgraph_core::constants::CONCEPT_LABEL;
use archgraph_core::errors::{AnalysisError, RuleExecutorError};
use archgraph_core::traits::GraphStore;
use archgraph_core::types::{QueryParameters, Severity};

use super::results::{AnalysisResults, RuleResult, SkippedRule};
use super::rule_set_executor::RuleSetExecutor;
use super::visitor::RuleVisitor;
use crate::rules::{Concept, Constraint, ExecutableRule, Group, RuleKind, RuleSelection, RuleSet};
use crate::verification::{Status, Strategies};

/// Runs a rule selection against a store.
pub struct Analyzer<'s> {
    store: &'s mut dyn GraphStore,
    config: &'s AnalyzeConfig,
    strategies: Strategies,
}

impl<'s> Analyzer<'s> {
    pub fn new(store: &'s mut dyn GraphStore, config: &'s AnalyzeConfig) -> Self {
        Self {
            store,
            config,
            strategies: Strategies::default(),
        }
    }

    pub fn with_strategies(mut self, strategies: Strategies) -> Self {
        self.strategies = strategies;
        self
    }

    /// Execute `selection`. Violations are reported in the results; a query
    /// or verification error aborts the run.
    pub fn execute(&mut self, rule_set: &RuleSet, selection: &RuleSelection) -> Result<AnalysisResults, AnalysisError> {
        let mut visitor = AnalyzerVisitor {
            store: &mut *self.store,
            config: self.config,
            strategies: &self.strategies,
            results: AnalysisResults::default(),
        };
        let resolved = RuleSetExecutor::new(&mut visitor).execute(rule_set, selection)?;
        let mut results = visitor.results;
        results.missing = resolved.missing;
        tracing::info!(
            concepts = results.concepts.len(),
            constraints = results.constraints.len(),
            failures = results.failures().len(),
            warnings = results.warnings().len(),
            "analysis finished"
        );
        Ok(results)
    }
}

struct AnalyzerVisitor<'a> {
    store: &'a mut dyn GraphStore,
    config: &'a AnalyzeConfig,
    strategies: &'a Strategies,
    results: AnalysisResults,
}

impl AnalyzerVisitor<'_> {
    fn parameters(&self, rule: &ExecutableRule) -> QueryParameters {
        let mut parameters = rule.parameters.clone();
        parameters.extend(self.config.rule_parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        parameters
    }

    fn is_applied(&self, concept: &Concept) -> Result<bool, AnalysisError> {
        Ok(self.store.find(CONCEPT_LABEL, &concept.id)?.is_some())
    }

    /// Map a verification outcome to the reported status for `severity`.
    fn effective_status(&self, verified: Status, severity: Severity) -> Status {
        match verified {
            Status::Failure if severity < self.config.effective_fail_on_severity() => Status::Warning,
            other => other,
        }
    }

    /// Query, verify and (for concepts) record one rule in its own transaction.
    fn execute(&mut self, rule: &ExecutableRule, severity: Severity) -> Result<RuleResult, AnalysisError> {
        let opened = !self.store.has_active_transaction();
        if opened {
            self.store.begin_transaction()?;
        }
        match self.execute_in_transaction(rule, severity) {
            Ok(result) => {
                if opened {
                    self.store.commit_transaction()?;
                }
                Ok(result)
            }
            Err(error) => {
                if opened && self.store.has_active_transaction() {
                    if let Err(rollback_err) = self.store.rollback_transaction() {
                        tracing::warn!(rule = %rule.id, error = %rollback_err, "rollback after failed rule failed");
                    }
                }
                Err(error)
            }
        }
    }

    fn execute_in_transaction(&mut self, rule: &ExecutableRule, severity: Severity) -> Result<RuleResult, AnalysisError> {
        tracing::debug!(rule = %rule.id, kind = %rule.kind, "executing rule");
        let parameters = self.parameters(rule);
        let result = self
            .store
            .execute_query(&rule.query, &parameters)
            .map_err(|source| RuleExecutorError::QueryFailed {
                rule: rule.id.clone(),
                source,
            })?;
        let verified = self.strategies.verify(rule, &result)?;
        let status = self.effective_status(verified, severity);

        if status == Status::Success && rule.kind == RuleKind::Concept {
            let node = self.store.merge(CONCEPT_LABEL, &rule.id)?;
            self.store.set_property(node, "status", status.to_string().into())?;
        }
        if status != Status::Success {
            if severity >= self.config.effective_warn_on_severity() {
                tracing::warn!(rule = %rule.id, %severity, %status, rows = result.row_count(), "rule not satisfied");
            } else {
                tracing::info!(rule = %rule.id, %severity, %status, rows = result.row_count(), "rule not satisfied");
            }
        }

        Ok(RuleResult {
            rule_id: rule.id.clone(),
            kind: rule.kind,
            description: rule.description.clone(),
            severity,
            status,
            columns: result.columns,
            rows: result.rows,
        })
    }
}

impl RuleVisitor for AnalyzerVisitor<'_> {
    type Error = AnalysisError;

    fn before_group(&mut self, group: &Group, severity: Option<Severity>) -> Result<(), Self::Error> {
        tracing::info!(group = %group.id, severity = ?severity, "executing group");
        Ok(())
    }

    fn visit_concept(&mut self, concept: &Concept, severity: Severity) -> Result<bool, Self::Error> {
        if !self.config.effective_execute_applied_concepts() && self.is_applied(concept)? {
            tracing::info!(concept = %concept.id, "concept already applied, skipping");
            self.results.already_applied.push(concept.id.clone());
            return Ok(true);
        }
        tracing::info!(concept = %concept.id, description = %concept.description, "applying concept");
        let result = self.execute(concept, severity)?;
        let satisfied = result.status == Status::Success;
        self.results.concepts.insert(concept.id.clone(), result);
        Ok(satisfied)
    }

    fn skip_concept(&mut self, concept: &Concept, _severity: Severity) -> Result<(), Self::Error> {
        tracing::warn!(concept = %concept.id, "required concepts not applied, skipping concept");
        self.results.skipped.push(SkippedRule {
            rule_id: concept.id.clone(),
            kind: concept.kind,
        });
        Ok(())
    }

    fn visit_constraint(&mut self, constraint: &Constraint, severity: Severity) -> Result<bool, Self::Error> {
        tracing::info!(constraint = %constraint.id, description = %constraint.description, "validating constraint");
        let result = self.execute(constraint, severity)?;
        let passed = result.status == Status::Success;
        self.results.constraints.insert(constraint.id.clone(), result);
        Ok(passed)
    }

    fn skip_constraint(&mut self, constraint: &Constraint, _severity: Severity) -> Result<(), Self::Error> {
        tracing::warn!(constraint = %constraint.id, "required concepts not applied, skipping constraint");
        self.results.skipped.push(SkippedRule {
            rule_id: constraint.id.clone(),
            kind: constraint.kind,
        });
        Ok(())
    }

    fn missing_concept(&mut self, id: &str) -> Result<(), Self::Error> {
        tracing::warn!(concept = id, "concept not found");
        Ok(())
    }

    fn missing_constraint(&mut self, id: &str) -> Result<(), Self::Error> {
        tracing::warn!(constraint = id, "constraint not found");
        Ok(())
    }

    fn missing_group(&mut self, id: &str) -> Result<(), Self::Error> {
        tracing::warn!(group = id, "group not found");
        Ok(())
    }
}
