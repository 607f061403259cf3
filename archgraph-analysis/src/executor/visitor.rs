//! Callbacks invoked by the rule set executor.

use archgraph_core::errors::RuleError;
use archgraph_core::types::Severity;

use crate::rules::{Concept, Constraint, Group};

/// Receives the rules of a resolved selection in execution order.
///
/// Only `visit_concept` and `visit_constraint` are required; every other
/// callback defaults to a no-op.
pub trait RuleVisitor {
    type Error: From<RuleError>;

    fn before_rules(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn after_rules(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn before_group(&mut self, _group: &Group, _severity: Option<Severity>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn after_group(&mut self, _group: &Group) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply a concept. Returns whether it is satisfied; concepts requiring
    /// an unsatisfied concept are skipped.
    fn visit_concept(&mut self, concept: &Concept, severity: Severity) -> Result<bool, Self::Error>;

    fn skip_concept(&mut self, _concept: &Concept, _severity: Severity) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Validate a constraint. Returns whether it passed.
    fn visit_constraint(&mut self, constraint: &Constraint, severity: Severity) -> Result<bool, Self::Error>;

    fn skip_constraint(&mut self, _constraint: &Constraint, _severity: Severity) -> Result<(), Self::Error> {
        Ok(())
    }

    fn missing_concept(&mut self, _id: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn missing_constraint(&mut self, _id: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn missing_group(&mut self, _id: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}
