//! Configuration-driven scan-then-analyze runs.

use std::path::Path;

use archgraph_analysis::pipeline::{self, load_rules};
use archgraph_analysis::verification::Status;
use archgraph_core::config::{ArchgraphConfig, StoreLifecycle};
use archgraph_core::errors::{AnalysisError, RuleError, ScanError};
use archgraph_storage::StoreProvider;
use tempfile::TempDir;

const RULES: &str = r#"
[[concept]]
id = "config:Json"
description = "JSON configuration files."
query = "SELECT node_id FROM node_labels WHERE label = 'Json'"

[[constraint]]
id = "config:SingleJson"
description = "A project has at most one JSON configuration file."
requires_concepts = ["config:Json"]
query = "SELECT COUNT(*) AS files FROM node_labels WHERE label = 'Json'"
verification = { type = "aggregation", max = 1 }

[[group]]
id = "default"
constraints = ["config:*"]
"#;

fn workspace(json_files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("project")).unwrap();
    std::fs::create_dir_all(dir.path().join("rules")).unwrap();
    for name in json_files {
        std::fs::write(dir.path().join("project").join(name), "{}").unwrap();
    }
    std::fs::write(dir.path().join("rules/config.toml"), RULES).unwrap();
    dir
}

fn config_for(root: &Path) -> ArchgraphConfig {
    let mut config = ArchgraphConfig::default();
    config.scan.include_files = vec![root.join("project").display().to_string()];
    config.rule.directories = vec![root.join("rules")];
    config.analyze.groups = vec!["default".to_string()];
    config
}

#[test]
fn run_scans_then_analyzes() {
    let dir = workspace(&["a.json", "b.json"]);
    let config = config_for(dir.path());
    let provider = StoreProvider::new();

    let outcome = pipeline::run(&config, &provider).unwrap();

    assert_eq!(outcome.scan.resources, 1);
    assert_eq!(outcome.analysis.concepts["config:Json"].status, Status::Success);
    assert_eq!(outcome.analysis.constraints["config:SingleJson"].status, Status::Failure);
    assert!(outcome.analysis.has_failures());
}

#[test]
fn passing_project_has_no_failures() {
    let dir = workspace(&["only.json"]);
    let config = config_for(dir.path());
    let provider = StoreProvider::new();

    let outcome = pipeline::run(&config, &provider).unwrap();
    assert!(!outcome.analysis.has_failures());
    assert_eq!(outcome.analysis.constraints["config:SingleJson"].status, Status::Success);
}

#[test]
fn rule_errors_fail_before_the_store_is_opened() {
    let dir = workspace(&["a.json"]);
    std::fs::write(
        dir.path().join("rules/cycle.toml"),
        "[[concept]]\nid = \"x\"\nrequires_concepts = [\"y\"]\nquery = \"q\"\n\
         [[concept]]\nid = \"y\"\nrequires_concepts = [\"x\"]\nquery = \"q\"\n",
    )
    .unwrap();
    let mut config = config_for(dir.path());
    config.analyze.groups.clear();
    let provider = StoreProvider::new();

    let err = pipeline::run(&config, &provider).unwrap_err();
    assert!(matches!(err, AnalysisError::Rule(RuleError::CyclicDependency { .. })));
    assert_eq!(provider.open_count(&config.store), None);
}

#[test]
fn load_rules_selects_everything_by_default() {
    let dir = workspace(&[]);
    let mut config = config_for(dir.path());
    config.analyze.groups.clear();

    let (rule_set, selection) = load_rules(&config).unwrap();
    assert_eq!(rule_set.len(), 3);
    assert_eq!(selection.concepts, vec!["config:Json"]);
    assert_eq!(selection.groups, vec!["default"]);
}

#[test]
fn module_store_is_stopped_after_the_run() {
    let dir = workspace(&["a.json"]);
    let mut config = config_for(dir.path());
    let db = dir.path().join("store/graph.db");
    config.store.uri = Some(format!("file:{}", db.display()));
    config.store.lifecycle = Some(StoreLifecycle::Module);
    let provider = StoreProvider::new();

    pipeline::run(&config, &provider).unwrap();
    assert_eq!(provider.open_count(&config.store), None);
    assert!(db.exists());
}

#[test]
fn reactor_store_outlives_the_run_and_keeps_the_graph() {
    let dir = workspace(&["a.json"]);
    let config = config_for(dir.path());
    let provider = StoreProvider::new();

    pipeline::run(&config, &provider).unwrap();
    assert_eq!(provider.open_count(&config.store), Some(0));

    let shared = provider.open(&config.store).unwrap();
    let store = shared.lock().unwrap();
    assert_eq!(store.count_labeled("Json").unwrap(), 1);
    assert_eq!(store.count_labeled("Concept").unwrap(), 1);
}

#[test]
fn scan_errors_abort_the_run_and_release_the_store() {
    let dir = workspace(&[]);
    std::fs::write(dir.path().join("project/broken.json"), "{ nope").unwrap();
    let config = config_for(dir.path());
    let provider = StoreProvider::new();

    let err = pipeline::run(&config, &provider).unwrap_err();
    assert!(matches!(err, AnalysisError::Scan(ScanError::Unrecoverable { .. })));
    assert_eq!(provider.open_count(&config.store), Some(0));
}
