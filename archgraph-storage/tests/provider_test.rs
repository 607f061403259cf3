//! Store-handle cache tests: reuse, open counts, lifecycles.

use std::sync::Arc;

use archgraph_core::config::{StoreConfig, StoreLifecycle};
use archgraph_core::traits::GraphStore;
use archgraph_storage::StoreProvider;
use tempfile::TempDir;

fn file_config(dir: &TempDir, lifecycle: StoreLifecycle) -> StoreConfig {
    StoreConfig {
        uri: Some(dir.path().join("graph.db").display().to_string()),
        lifecycle: Some(lifecycle),
        reset_on_start: None,
    }
}

#[test]
fn same_config_shares_one_store() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, StoreLifecycle::Reactor);
    let provider = StoreProvider::new();

    let a = provider.open(&config).unwrap();
    let b = provider.open(&config).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(provider.open_count(&config), Some(2));
}

#[test]
fn module_lifecycle_stops_at_zero() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, StoreLifecycle::Module);
    let provider = StoreProvider::new();

    let a = provider.open(&config).unwrap();
    let _b = provider.open(&config).unwrap();
    provider.release(&config).unwrap();
    assert!(a.lock().unwrap().is_started());
    provider.release(&config).unwrap();
    assert!(!a.lock().unwrap().is_started());
    assert_eq!(provider.open_count(&config), None);
}

#[test]
fn reactor_lifecycle_survives_until_close_all() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, StoreLifecycle::Reactor);
    let provider = StoreProvider::new();

    let store = provider.open(&config).unwrap();
    provider.release(&config).unwrap();
    assert!(store.lock().unwrap().is_started());
    assert_eq!(provider.open_count(&config), Some(0));

    provider.close_all().unwrap();
    assert!(!store.lock().unwrap().is_started());
    assert_eq!(provider.open_count(&config), None);
}

#[test]
fn reset_on_start_clears_existing_graph() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir, StoreLifecycle::Module);

    let provider = StoreProvider::new();
    {
        let store = provider.open(&config).unwrap();
        let mut guard = store.lock().unwrap();
        guard.begin_transaction().unwrap();
        guard.create("File", Some("/a")).unwrap();
        guard.commit_transaction().unwrap();
    }
    provider.release(&config).unwrap();

    config.reset_on_start = Some(true);
    let store = provider.open(&config).unwrap();
    assert_eq!(store.lock().unwrap().node_count().unwrap(), 0);
}
