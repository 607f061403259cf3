//! Scanner engine tests: plugin dispatch, per-item transactions, failure
//! handling, and the configuration-driven scan task.

use std::collections::BTreeMap;

use archgraph_analysis::plugins::default_registry;
use archgraph_analysis::scanner::{
    ItemKind, PluginRegistry, ScanItem, ScanTask, Scanner, ScannerConfig, ScannerPlugin, Scope,
};
use archgraph_core::config::ScanConfig;
use archgraph_core::errors::{ScanError, StorageError};
use archgraph_core::traits::GraphStore;
use archgraph_core::types::{NodeId, QueryParameters, QueryResult, QueryValue};
use archgraph_storage::SqliteGraphStore;
use tempfile::TempDir;

/// Delegates to an in-memory store and counts transaction calls.
struct RecordingStore {
    inner: SqliteGraphStore,
    begins: usize,
    commits: usize,
    rollbacks: usize,
    savepoint_rollbacks: usize,
    fail_begins: bool,
    fail_commits: bool,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: SqliteGraphStore::open_in_memory().unwrap(),
            begins: 0,
            commits: 0,
            rollbacks: 0,
            savepoint_rollbacks: 0,
            fail_begins: false,
            fail_commits: false,
        }
    }

    fn failing_begins() -> Self {
        Self {
            fail_begins: true,
            ..Self::new()
        }
    }

    fn failing_commits() -> Self {
        Self {
            fail_commits: true,
            ..Self::new()
        }
    }
}

impl GraphStore for RecordingStore {
    fn start(&mut self) -> Result<(), StorageError> {
        self.inner.start()
    }

    fn stop(&mut self) -> Result<(), StorageError> {
        self.inner.stop()
    }

    fn reset(&mut self) -> Result<(), StorageError> {
        self.inner.reset()
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        self.begins += 1;
        if self.fail_begins {
            return Err(StorageError::SqliteError {
                message: "database is locked".to_string(),
            });
        }
        self.inner.begin_transaction()
    }

    fn commit_transaction(&mut self) -> Result<(), StorageError> {
        self.commits += 1;
        if self.fail_commits {
            return Err(StorageError::SqliteError {
                message: "disk full".to_string(),
            });
        }
        self.inner.commit_transaction()
    }

    fn rollback_transaction(&mut self) -> Result<(), StorageError> {
        self.rollbacks += 1;
        self.inner.rollback_transaction()
    }

    fn has_active_transaction(&self) -> bool {
        self.inner.has_active_transaction()
    }

    fn savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        self.inner.savepoint(name)
    }

    fn release_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        self.inner.release_savepoint(name)
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        self.savepoint_rollbacks += 1;
        self.inner.rollback_to_savepoint(name)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        self.inner.flush()
    }

    fn create(&mut self, label: &str, key: Option<&str>) -> Result<NodeId, StorageError> {
        self.inner.create(label, key)
    }

    fn find(&self, label: &str, key: &str) -> Result<Option<NodeId>, StorageError> {
        self.inner.find(label, key)
    }

    fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), StorageError> {
        self.inner.add_label(node, label)
    }

    fn labels(&self, node: NodeId) -> Result<Vec<String>, StorageError> {
        self.inner.labels(node)
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: QueryValue) -> Result<(), StorageError> {
        self.inner.set_property(node, name, value)
    }

    fn property(&self, node: NodeId, name: &str) -> Result<Option<QueryValue>, StorageError> {
        self.inner.property(node, name)
    }

    fn create_relation(&mut self, from: NodeId, relation: &str, to: NodeId) -> Result<(), StorageError> {
        self.inner.create_relation(from, relation, to)
    }

    fn execute_query(&mut self, query: &str, params: &QueryParameters) -> Result<QueryResult, StorageError> {
        self.inner.execute_query(query, params)
    }
}

/// Creates one `Item` node keyed by the scanned path.
struct ItemPlugin;

impl ScannerPlugin for ItemPlugin {
    fn name(&self) -> &str {
        "item"
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::File
    }

    fn accepts(&self, _item: &ScanItem, path: &str, _scope: &Scope) -> bool {
        !path.ends_with(".skip")
    }

    fn scan(
        &self,
        _item: &ScanItem,
        path: &str,
        _scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        Ok(Some(scanner.context().store().create("Item", Some(path))?))
    }
}

/// Writes a node, then fails.
struct BrokenPlugin;

impl ScannerPlugin for BrokenPlugin {
    fn name(&self) -> &str {
        "broken"
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::File
    }

    fn accepts(&self, _item: &ScanItem, _path: &str, _scope: &Scope) -> bool {
        true
    }

    fn scan(
        &self,
        _item: &ScanItem,
        path: &str,
        _scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        scanner.context().store().create("Item", Some(path))?;
        Err(ScanError::PluginFailed {
            plugin: "broken".to_string(),
            path: path.to_string(),
            message: "unexpected content".to_string(),
        })
    }
}

fn registry_with(plugin: Box<dyn ScannerPlugin>) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(plugin, &BTreeMap::new()).unwrap();
    registry
}

fn continuing() -> ScannerConfig {
    ScannerConfig {
        continue_on_error: true,
        ..ScannerConfig::default()
    }
}

#[test]
fn successful_scan_commits_its_transaction() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::new();
    {
        let mut scanner = Scanner::new(&registry, &mut store, ScannerConfig::default());
        let node = scanner
            .scan(&ScanItem::file("a.txt"), "/a.txt", &Scope::none())
            .unwrap();
        assert!(node.is_some());
        assert_eq!(scanner.stats().scanned, 1);
    }
    assert_eq!((store.begins, store.commits, store.rollbacks), (1, 1, 0));
    assert!(store.inner.find("Item", "/a.txt").unwrap().is_some());
}

#[test]
fn unaccepted_item_is_skipped_without_transaction() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::new();
    {
        let mut scanner = Scanner::new(&registry, &mut store, ScannerConfig::default());
        let node = scanner
            .scan(&ScanItem::file("a.skip"), "/a.skip", &Scope::none())
            .unwrap();
        assert!(node.is_none());
        assert_eq!(scanner.stats().skipped, 1);
    }
    assert_eq!(store.begins, 0);
}

#[test]
fn failure_without_continue_rolls_back_and_is_unrecoverable() {
    let registry = registry_with(Box::new(BrokenPlugin));
    let mut store = RecordingStore::new();
    let scope = Scope::new("java", "classpath");
    let result = {
        let mut scanner = Scanner::new(&registry, &mut store, ScannerConfig::default());
        scanner.scan(&ScanItem::file("bad.json"), "/bad.json", &scope)
    };

    let err = result.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unable to scan 'bad.json'"), "{message}");
    assert!(message.contains("path '/bad.json'"), "{message}");
    assert!(message.contains("scope 'java:classpath'"), "{message}");
    assert!(matches!(
        err,
        ScanError::Unrecoverable {
            continue_on_error: false,
            ..
        }
    ));
    assert_eq!((store.begins, store.commits, store.rollbacks), (1, 0, 1));
    assert_eq!(store.inner.count_labeled("Item").unwrap(), 0);
}

#[test]
fn failures_under_continue_on_error_are_rolled_back_and_skipped() {
    let registry = registry_with(Box::new(BrokenPlugin));
    let mut store = RecordingStore::new();
    {
        let mut scanner = Scanner::new(&registry, &mut store, continuing());
        for path in ["/one.json", "/two.json"] {
            let node = scanner
                .scan(&ScanItem::file(path), path, &Scope::none())
                .unwrap();
            assert!(node.is_none());
        }
        assert_eq!(scanner.stats().failed, 2);
        assert_eq!(scanner.stats().scanned, 0);
    }
    assert_eq!((store.begins, store.commits, store.rollbacks), (2, 0, 2));
    assert_eq!(store.inner.count_labeled("Item").unwrap(), 0);
}

#[test]
fn failed_commit_is_rolled_back_and_skipped_under_continue_on_error() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::failing_commits();
    {
        let mut scanner = Scanner::new(&registry, &mut store, continuing());
        for path in ["/one.txt", "/two.txt"] {
            assert!(scanner
                .scan(&ScanItem::file(path), path, &Scope::none())
                .unwrap()
                .is_none());
        }
    }
    assert_eq!((store.begins, store.commits, store.rollbacks), (2, 2, 2));
    assert!(!store.inner.has_active_transaction());
    assert_eq!(store.inner.count_labeled("Item").unwrap(), 0);
}

#[test]
fn scan_inside_open_transaction_leaves_it_to_the_caller() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::new();
    store.begin_transaction().unwrap();
    {
        let mut scanner = Scanner::new(&registry, &mut store, ScannerConfig::default());
        scanner
            .scan(&ScanItem::file("a.txt"), "/a.txt", &Scope::none())
            .unwrap();
    }
    assert_eq!(store.commits, 0);
    assert!(store.has_active_transaction());
    store.commit_transaction().unwrap();
}

#[test]
fn failed_scan_inside_open_transaction_undoes_only_its_own_writes() {
    let registry = registry_with(Box::new(BrokenPlugin));
    let mut store = RecordingStore::new();
    store.begin_transaction().unwrap();
    let outer = store.create("Outer", Some("kept")).unwrap();
    {
        let mut scanner = Scanner::new(&registry, &mut store, continuing());
        let node = scanner
            .scan(&ScanItem::file("bad.json"), "/bad.json", &Scope::none())
            .unwrap();
        assert!(node.is_none());
        assert_eq!(scanner.stats().failed, 1);
    }
    assert_eq!((store.commits, store.rollbacks, store.savepoint_rollbacks), (0, 0, 1));
    assert!(store.has_active_transaction());
    store.commit_transaction().unwrap();

    assert_eq!(store.inner.find("Outer", "kept").unwrap(), Some(outer));
    assert_eq!(store.inner.count_labeled("Item").unwrap(), 0);
}

#[test]
fn failed_begin_is_reported_with_the_item_path() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::failing_begins();
    let err = {
        let mut scanner = Scanner::new(&registry, &mut store, ScannerConfig::default());
        scanner
            .scan(&ScanItem::file("a.txt"), "/a.txt", &Scope::none())
            .unwrap_err()
    };
    match err {
        ScanError::Unrecoverable { path, source, .. } => {
            assert_eq!(path, "/a.txt");
            assert!(matches!(*source, ScanError::Storage(StorageError::SqliteError { .. })));
        }
        other => panic!("expected Unrecoverable, got {other}"),
    }
    assert_eq!((store.commits, store.rollbacks), (0, 0));
}

#[test]
fn failed_begin_is_skipped_under_continue_on_error() {
    let registry = registry_with(Box::new(ItemPlugin));
    let mut store = RecordingStore::failing_begins();
    let mut scanner = Scanner::new(&registry, &mut store, continuing());
    let node = scanner
        .scan(&ScanItem::file("a.txt"), "/a.txt", &Scope::none())
        .unwrap();
    assert!(node.is_none());
    assert_eq!(scanner.stats().failed, 1);
}

#[test]
fn invalid_exclude_pattern_is_a_config_error() {
    let config = ScanConfig {
        exclude: vec!["[".to_string()],
        ..ScanConfig::default()
    };
    assert!(matches!(
        ScannerConfig::from_scan_config(&config),
        Err(ScanError::Config(_))
    ));
}

// ---- scan task ----

fn task_registry() -> PluginRegistry {
    default_registry(&BTreeMap::new()).unwrap()
}

#[test]
fn task_skips_missing_files() {
    let dir = TempDir::new().unwrap();
    let registry = task_registry();
    let config = ScanConfig {
        include_files: vec![dir.path().join("absent.json").display().to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();

    let summary = ScanTask::new(&registry, &config).run(&mut store).unwrap();
    assert_eq!(summary.resources, 0);
    assert_eq!(summary.missing, vec![dir.path().join("absent.json")]);
    assert_eq!(store.node_count().unwrap(), 0);
}

#[test]
fn task_scans_files_with_scope_suffix() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.json"), r#"{"name": "app"}"#).unwrap();
    let registry = task_registry();
    let config = ScanConfig {
        include_files: vec![format!("{};java:classpath", dir.path().join("app.json").display())],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();

    let summary = ScanTask::new(&registry, &config).run(&mut store).unwrap();
    assert_eq!(summary.resources, 1);
    assert_eq!(summary.stats.scanned, 1);
    assert_eq!(store.count_labeled("Json").unwrap(), 1);
}

#[test]
fn task_rejects_malformed_url_before_touching_the_store() {
    let registry = task_registry();
    let config = ScanConfig {
        reset: Some(true),
        include_urls: vec!["not a url".to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();
    store.begin_transaction().unwrap();
    store.create("Existing", Some("kept")).unwrap();
    store.commit_transaction().unwrap();

    let err = ScanTask::new(&registry, &config).run(&mut store).unwrap_err();
    assert!(matches!(err, ScanError::Config(_)));
    assert_eq!(store.count_labeled("Existing").unwrap(), 1);
}

#[test]
fn task_fails_on_resource_no_plugin_accepts() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "plain text").unwrap();
    let registry = task_registry();
    let config = ScanConfig {
        include_files: vec![notes.display().to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();

    let err = ScanTask::new(&registry, &config).run(&mut store).unwrap_err();
    match err {
        ScanError::NotAccepted { path, .. } => assert!(path.ends_with("notes.txt")),
        other => panic!("expected NotAccepted, got {other}"),
    }
}

#[test]
fn task_fails_on_unsupported_url_scheme() {
    let registry = task_registry();
    let config = ScanConfig {
        include_urls: vec!["https://example.org/app.jar".to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();

    let err = ScanTask::new(&registry, &config).run(&mut store).unwrap_err();
    assert!(matches!(err, ScanError::NotAccepted { .. }));
}

#[test]
fn task_scans_file_urls() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.yaml"), "name: a\n").unwrap();
    let url = url::Url::from_directory_path(dir.path()).unwrap();
    let registry = task_registry();
    let config = ScanConfig {
        include_urls: vec![url.to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();

    let summary = ScanTask::new(&registry, &config).run(&mut store).unwrap();
    assert_eq!(summary.resources, 1);
    assert_eq!(store.count_labeled("Directory").unwrap(), 1);
    assert_eq!(store.count_labeled("Yaml").unwrap(), 1);
}

#[test]
fn task_resets_store_when_configured() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.json"), "[1, 2]").unwrap();
    let registry = task_registry();
    let config = ScanConfig {
        reset: Some(true),
        include_files: vec![dir.path().join("app.json").display().to_string()],
        ..ScanConfig::default()
    };
    let mut store = SqliteGraphStore::open_in_memory().unwrap();
    store.begin_transaction().unwrap();
    store.create("Existing", Some("dropped")).unwrap();
    store.commit_transaction().unwrap();

    ScanTask::new(&registry, &config).run(&mut store).unwrap();
    assert_eq!(store.count_labeled("Existing").unwrap(), 0);
    assert_eq!(store.count_labeled("Json").unwrap(), 1);
}
