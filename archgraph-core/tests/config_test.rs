//! Tests for the archgraph configuration system.

use std::sync::Mutex;

use archgraph_core::config::{ArchgraphConfig, CliOverrides, StoreLifecycle};
use archgraph_core::errors::ConfigError;
use archgraph_core::types::Severity;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all ARCHGRAPH_ env vars and point HOME at an empty directory.
fn isolate_env(home: &std::path::Path) {
    for key in [
        "ARCHGRAPH_SCAN_CONTINUE_ON_ERROR",
        "ARCHGRAPH_ANALYZE_FAIL_ON_SEVERITY",
        "ARCHGRAPH_ANALYZE_WARN_ON_SEVERITY",
        "ARCHGRAPH_STORE_URI",
        "ARCHGRAPH_STORE_LIFECYCLE",
    ] {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
}

#[test]
fn empty_config_yields_defaults() {
    let config = ArchgraphConfig::from_toml("").unwrap();
    assert!(!config.scan.effective_continue_on_error());
    assert!(!config.scan.effective_reset());
    assert_eq!(config.analyze.effective_fail_on_severity(), Severity::Major);
    assert_eq!(config.analyze.effective_warn_on_severity(), Severity::Minor);
    assert!(config.analyze.selects_all());
    assert_eq!(config.rule.effective_default_concept_severity(), Severity::Minor);
    assert_eq!(config.rule.effective_default_constraint_severity(), Severity::Major);
    assert_eq!(config.store.effective_uri(), ":memory:");
    assert!(config.store.is_in_memory());
    assert_eq!(config.store.effective_lifecycle(), StoreLifecycle::Reactor);
}

#[test]
fn four_layer_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let user_dir = home.path().join(".archgraph");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(
        user_dir.join("config.toml"),
        r#"
[store]
uri = "/user/graph.db"
lifecycle = "module"

[rule]
default_concept_severity = "info"
"#,
    )
    .unwrap();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("archgraph.toml"),
        r#"
[scan]
continue_on_error = false

[store]
uri = "/project/graph.db"

[analyze]
fail_on_severity = "critical"
concepts = ["layer:*"]
"#,
    )
    .unwrap();

    std::env::set_var("ARCHGRAPH_SCAN_CONTINUE_ON_ERROR", "true");
    std::env::set_var("ARCHGRAPH_STORE_URI", "/env/graph.db");

    let cli = CliOverrides {
        store_uri: Some("/cli/graph.db".to_string()),
        ..Default::default()
    };
    let config = ArchgraphConfig::load(dir.path(), Some(&cli)).unwrap();

    assert_eq!(config.store.effective_uri(), "/cli/graph.db");
    assert!(config.scan.effective_continue_on_error());
    assert_eq!(config.analyze.effective_fail_on_severity(), Severity::Critical);
    assert_eq!(config.analyze.concepts, vec!["layer:*".to_string()]);
    // Only the user layer sets these.
    assert_eq!(config.store.effective_lifecycle(), StoreLifecycle::Module);
    assert_eq!(config.rule.effective_default_concept_severity(), Severity::Info);

    isolate_env(home.path());
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    let config = ArchgraphConfig::load(dir.path(), None).unwrap();
    assert!(config.store.is_in_memory());
    assert!(config.scan.include_files.is_empty());
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    std::fs::write(dir.path().join("archgraph.toml"), "not toml {{{{").unwrap();
    match ArchgraphConfig::load(dir.path(), None) {
        Err(ConfigError::ParseError { .. }) => {}
        other => panic!("Expected ParseError, got: {other:?}"),
    }
}

#[test]
fn unknown_severity_is_rejected() {
    let result = ArchgraphConfig::from_toml("[analyze]\nfail_on_severity = \"fatal\"\n");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn invalid_env_lifecycle_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::env::set_var("ARCHGRAPH_STORE_LIFECYCLE", "forever");
    let dir = tempdir();
    let result = ArchgraphConfig::load(dir.path(), None);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

    isolate_env(home.path());
}

#[test]
fn warn_threshold_above_fail_threshold_fails_validation() {
    let result = ArchgraphConfig::from_toml(
        "[analyze]\nfail_on_severity = \"minor\"\nwarn_on_severity = \"critical\"\n",
    );
    match result {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "analyze.warn_on_severity")
        }
        other => panic!("Expected ValidationFailed, got: {other:?}"),
    }
}

#[test]
fn invalid_exclude_glob_fails_validation() {
    let result = ArchgraphConfig::from_toml("[scan]\nexclude = [\"a/[b\"]\n");
    assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));
}

#[test]
fn cli_selection_replaces_file_selection() {
    let mut config = ArchgraphConfig::from_toml("[analyze]\nconstraints = [\"a\", \"b\"]\n").unwrap();
    let cli = CliOverrides {
        constraints: vec!["c".to_string()],
        fail_on_severity: Some(Severity::Blocker),
        ..Default::default()
    };
    ArchgraphConfig::apply_cli_overrides(&mut config, &cli);
    assert_eq!(config.analyze.constraints, vec!["c".to_string()]);
    assert_eq!(config.analyze.effective_fail_on_severity(), Severity::Blocker);
}

#[test]
fn to_toml_round_trips() {
    let original = ArchgraphConfig::from_toml(
        r#"
[scan]
continue_on_error = true
include_files = ["target/classes;java:classpath"]

[scan.properties]
"yaml.strict" = "true"

[analyze]
groups = ["default"]

[analyze.rule_parameters]
threshold = 10
"#,
    )
    .unwrap();
    let text = original.to_toml().unwrap();
    let parsed = ArchgraphConfig::from_toml(&text).unwrap();
    assert!(parsed.scan.effective_continue_on_error());
    assert_eq!(parsed.scan.include_files, original.scan.include_files);
    assert_eq!(parsed.scan.properties.get("yaml.strict").map(String::as_str), Some("true"));
    assert_eq!(parsed.analyze.groups, vec!["default".to_string()]);
    assert_eq!(
        parsed.analyze.rule_parameters.get("threshold"),
        original.analyze.rule_parameters.get("threshold")
    );
}

#[test]
fn boolean_rule_parameters_are_accepted() {
    let config = ArchgraphConfig::from_toml(
        r#"
[analyze.rule_parameters]
strict = true
"#,
    )
    .unwrap();
    assert_eq!(
        config.analyze.rule_parameters.get("strict"),
        Some(&archgraph_core::types::QueryValue::Integer(1))
    );
}
