//! Rule set executor: visiting order, skipping and group severities,
//! observed through a scripted visitor.

use std::collections::BTreeSet;

use archgraph_analysis::executor::{RuleSetExecutor, RuleState, RuleVisitor};
use archgraph_analysis::rules::{Concept, Constraint, Group, RuleFormat, RuleParser, RuleSelection, RuleSet, RuleSource};
use archgraph_core::config::RuleConfig;
use archgraph_core::errors::RuleError;
use archgraph_core::types::Severity;

const RULES: &str = r#"
[[concept]]
id = "base"
query = "q"

[[concept]]
id = "broken"
query = "q"

[[concept]]
id = "derived"
requires_concepts = ["base"]
query = "q"

[[concept]]
id = "on-broken"
requires_concepts = ["broken"]
query = "q"

[[constraint]]
id = "k:plain"
query = "q"

[[constraint]]
id = "k:needs-broken"
requires_concepts = ["on-broken"]
query = "q"

[[constraint]]
id = "k:overridden"
severity = "info"
query = "q"

[[group]]
id = "outer"
severity = "critical"
constraints = ["k:plain", { id = "k:overridden", severity = "minor" }]
groups = ["inner"]

[[group]]
id = "inner"
constraints = ["k:needs-broken"]
"#;

fn rule_set() -> RuleSet {
    RuleParser::new()
        .parse(&[RuleSource::inline("rules.toml", RuleFormat::Toml, RULES)], &RuleConfig::default())
        .unwrap()
}

/// Records every callback; rules listed in `failing` report failure.
#[derive(Default)]
struct ScriptedVisitor {
    failing: BTreeSet<String>,
    events: Vec<String>,
}

impl ScriptedVisitor {
    fn failing(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            events: Vec::new(),
        }
    }

    fn events_starting(&self, prefix: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl RuleVisitor for ScriptedVisitor {
    type Error = RuleError;

    fn before_rules(&mut self) -> Result<(), RuleError> {
        self.events.push("begin".to_string());
        Ok(())
    }

    fn after_rules(&mut self) -> Result<(), RuleError> {
        self.events.push("end".to_string());
        Ok(())
    }

    fn before_group(&mut self, group: &Group, severity: Option<Severity>) -> Result<(), RuleError> {
        self.events.push(format!("group {} {severity:?}", group.id));
        Ok(())
    }

    fn after_group(&mut self, group: &Group) -> Result<(), RuleError> {
        self.events.push(format!("/group {}", group.id));
        Ok(())
    }

    fn visit_concept(&mut self, concept: &Concept, severity: Severity) -> Result<bool, RuleError> {
        self.events.push(format!("concept {} {severity}", concept.id));
        Ok(!self.failing.contains(&concept.id))
    }

    fn skip_concept(&mut self, concept: &Concept, _severity: Severity) -> Result<(), RuleError> {
        self.events.push(format!("skip concept {}", concept.id));
        Ok(())
    }

    fn visit_constraint(&mut self, constraint: &Constraint, severity: Severity) -> Result<bool, RuleError> {
        self.events.push(format!("constraint {} {severity}", constraint.id));
        Ok(!self.failing.contains(&constraint.id))
    }

    fn skip_constraint(&mut self, constraint: &Constraint, _severity: Severity) -> Result<(), RuleError> {
        self.events.push(format!("skip constraint {}", constraint.id));
        Ok(())
    }

    fn missing_concept(&mut self, id: &str) -> Result<(), RuleError> {
        self.events.push(format!("missing concept {id}"));
        Ok(())
    }
}

fn no_ids() -> Vec<String> {
    Vec::new()
}

#[test]
fn concepts_run_after_their_requirements() {
    let rule_set = rule_set();
    let mut visitor = ScriptedVisitor::default();
    RuleSetExecutor::new(&mut visitor)
        .execute(&rule_set, &RuleSelection::of(["derived"], no_ids(), no_ids()))
        .unwrap();
    assert_eq!(
        visitor.events,
        vec!["begin", "concept base minor", "concept derived minor", "end"]
    );
}

#[test]
fn failed_requirement_skips_dependents_transitively() {
    let rule_set = rule_set();
    let mut visitor = ScriptedVisitor::failing(&["broken"]);
    {
        let mut executor = RuleSetExecutor::new(&mut visitor);
        executor
            .execute(&rule_set, &RuleSelection::of(no_ids(), ["k:needs-broken"], no_ids()))
            .unwrap();
        assert_eq!(executor.concept_state("broken"), Some(RuleState::Failed));
        assert_eq!(executor.concept_state("on-broken"), Some(RuleState::Skipped));
        assert_eq!(executor.constraint_state("k:needs-broken"), Some(RuleState::Skipped));
    }
    assert_eq!(
        visitor.events_starting("skip"),
        vec!["skip concept on-broken", "skip constraint k:needs-broken"]
    );
}

#[test]
fn groups_apply_their_severity_to_included_constraints() {
    let rule_set = rule_set();
    let mut visitor = ScriptedVisitor::default();
    RuleSetExecutor::new(&mut visitor)
        .execute(&rule_set, &RuleSelection::of(no_ids(), no_ids(), ["outer"]))
        .unwrap();

    assert_eq!(
        visitor.events_starting("constraint"),
        vec![
            "constraint k:overridden minor",
            "constraint k:plain critical",
            "constraint k:needs-broken critical",
        ]
    );
    assert_eq!(
        visitor.events_starting("group"),
        vec!["group outer Some(Critical)", "group inner Some(Critical)"]
    );
    let tail: Vec<&str> = visitor.events.iter().rev().take(3).map(String::as_str).collect();
    assert_eq!(tail, vec!["end", "/group outer", "/group inner"]);
}

#[test]
fn rules_are_visited_once_across_groups_and_direct_selection() {
    let rule_set = rule_set();
    let mut visitor = ScriptedVisitor::default();
    RuleSetExecutor::new(&mut visitor)
        .execute(
            &rule_set,
            &RuleSelection::of(["base"], ["k:plain", "k:needs-broken"], ["outer", "inner"]),
        )
        .unwrap();

    for id in ["k:plain", "k:needs-broken", "k:overridden"] {
        let visits = visitor
            .events
            .iter()
            .filter(|e| e.starts_with(&format!("constraint {id} ")))
            .count();
        assert_eq!(visits, 1, "{id}");
    }
    assert_eq!(visitor.events_starting("group inner").len(), 1);
}

#[test]
fn missing_ids_are_reported_before_any_rule() {
    let rule_set = rule_set();
    let mut visitor = ScriptedVisitor::default();
    let resolved = RuleSetExecutor::new(&mut visitor)
        .execute(&rule_set, &RuleSelection::of(["ghost", "base"], no_ids(), no_ids()))
        .unwrap();
    assert!(resolved.missing.concepts.contains("ghost"));
    assert_eq!(visitor.events[..3], ["begin", "missing concept ghost", "concept base minor"]);
}

#[test]
fn resolution_errors_reach_the_caller() {
    let cyclic = RuleParser::new()
        .parse(
            &[RuleSource::inline(
                "cycle.toml",
                RuleFormat::Toml,
                "[[concept]]\nid = \"a\"\nrequires_concepts = [\"b\"]\nquery = \"q\"\n\
                 [[concept]]\nid = \"b\"\nrequires_concepts = [\"a\"]\nquery = \"q\"\n",
            )],
            &RuleConfig::default(),
        )
        .unwrap();
    let mut visitor = ScriptedVisitor::default();
    let err = RuleSetExecutor::new(&mut visitor)
        .execute(&cyclic, &RuleSelection::all_of(&cyclic))
        .unwrap_err();
    assert!(matches!(err, RuleError::CyclicDependency { .. }));
    assert!(visitor.events.is_empty());
}
