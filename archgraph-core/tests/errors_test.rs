//! Tests for the archgraph error handling system.

use std::path::PathBuf;

use archgraph_core::errors::*;

#[test]
fn every_error_has_an_error_code() {
    let errors: Vec<Box<dyn Fn() -> &'static str>> = vec![
        Box::new(|| ConfigError::FileNotFound { path: "/tmp".into() }.error_code()),
        Box::new(|| StorageError::NotStarted.error_code()),
        Box::new(|| ScanError::MissingContextValue { type_name: "u8" }.error_code()),
        Box::new(|| RuleError::NoReaderForSource { source_id: "x".into() }.error_code()),
        Box::new(|| RuleExecutorError::NoColumns.error_code()),
        Box::new(|| AnalysisError::from(StorageError::LockPoisoned).error_code()),
    ];
    for code in errors {
        assert!(!code().is_empty());
    }
}

#[test]
fn storage_codes_distinguish_transactions_and_migrations() {
    assert_eq!(StorageError::NoActiveTransaction.error_code(), "TRANSACTION_ERROR");
    assert_eq!(
        StorageError::MigrationFailed { version: 2, message: "x".into() }.error_code(),
        "MIGRATION_FAILED"
    );
    assert_eq!(
        StorageError::SqliteError { message: "x".into() }.error_code(),
        "STORAGE_ERROR"
    );
}

#[test]
fn unrecoverable_scan_message_names_item_path_and_scope() {
    let err = ScanError::Unrecoverable {
        item: "lib/app.jar".into(),
        path: "/app.jar".into(),
        scope: "java:classpath".into(),
        continue_on_error: false,
        source: Box::new(ScanError::IoError {
            path: PathBuf::from("lib/app.jar"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }),
    };
    let message = err.to_string();
    assert!(message.contains("lib/app.jar"));
    assert!(message.contains("/app.jar"));
    assert!(message.contains("java:classpath"));
    assert!(message.contains("continue_on_error=false"));
    assert_eq!(err.error_code(), "UNRECOVERABLE_SCAN");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn cycle_message_lists_the_path() {
    let err = RuleError::CyclicDependency {
        path: vec!["a".into(), "b".into(), "a".into()],
    };
    assert_eq!(err.to_string(), "Cyclic concept dependency: a -> b -> a");
    assert_eq!(err.error_code(), "RULE_CYCLE");
}

#[test]
fn verification_messages_are_exact() {
    assert_eq!(
        RuleExecutorError::NoColumns.to_string(),
        "Result contains no columns, at least one with a numeric value is expected."
    );
    assert_eq!(
        RuleExecutorError::ColumnMissing { column: "x".into() }.to_string(),
        "The result does not contain a column 'x'"
    );
    assert_eq!(
        RuleExecutorError::NonNumericValue {
            column: "x".into(),
            value: "abc".into()
        }
        .to_string(),
        "The value in column 'x' must be a numeric value but was 'abc'"
    );
}

#[test]
fn from_conversions_into_analysis_error() {
    let scan: AnalysisError = ScanError::NotAccepted {
        path: "a".into(),
        scope: "".into(),
    }
    .into();
    assert!(matches!(scan, AnalysisError::Scan(ScanError::NotAccepted { .. })));

    let rule: AnalysisError = RuleError::InvalidSeverity { value: "x".into() }.into();
    assert!(matches!(rule, AnalysisError::Rule(_)));

    let exec: AnalysisError = RuleExecutorError::NoColumns.into();
    assert_eq!(exec.error_code(), "VERIFICATION_ERROR");
}

#[test]
fn coded_string_prefixes_the_code() {
    let err = ConfigError::InvalidValue {
        field: "store.lifecycle".into(),
        message: "bad".into(),
    };
    assert!(err.coded_string().starts_with("[CONFIG_ERROR] "));
}
