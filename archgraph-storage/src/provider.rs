//! Store-handle cache shared by everything that runs in one process.
//!
//! Stores are keyed by their resolved URI and handed out as
//! `Arc<Mutex<SqliteGraphStore>>`; the mutex serializes scans and analyses
//! that share one store. Each `open` bumps an open count and each `release`
//! drops it. A `Module` store stops when its count reaches zero, a `Reactor`
//! store stays open until `close_all`.

use std::sync::{Arc, Mutex};

use archgraph_core::config::{StoreConfig, StoreLifecycle};
use archgraph_core::errors::StorageError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::FxHashMap;

use crate::store::{SqliteGraphStore, StoreLocation};

pub type SharedStore = Arc<Mutex<SqliteGraphStore>>;

struct CachedStore {
    store: SharedStore,
    open_count: usize,
    lifecycle: StoreLifecycle,
}

#[derive(Default)]
pub struct StoreProvider {
    stores: Mutex<FxHashMap<StoreLocation, CachedStore>>,
}

impl StoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the store for `config`, starting it on first use.
    pub fn open(&self, config: &StoreConfig) -> Result<SharedStore, StorageError> {
        let location = StoreLocation::from_uri(config.effective_uri());
        let mut stores = self.stores.lock().map_err(|_| StorageError::LockPoisoned)?;

        if let Some(cached) = stores.get_mut(&location) {
            cached.open_count += 1;
            tracing::debug!(?location, open_count = cached.open_count, "reusing cached store");
            return Ok(Arc::clone(&cached.store));
        }

        let mut store = SqliteGraphStore::new(location.clone());
        store.start()?;
        if config.effective_reset_on_start() {
            store.reset()?;
        }
        let shared = Arc::new(Mutex::new(store));
        stores.insert(
            location,
            CachedStore {
                store: Arc::clone(&shared),
                open_count: 1,
                lifecycle: config.effective_lifecycle(),
            },
        );
        Ok(shared)
    }

    /// Give back one handle obtained from `open`.
    pub fn release(&self, config: &StoreConfig) -> Result<(), StorageError> {
        let location = StoreLocation::from_uri(config.effective_uri());
        let mut stores = self.stores.lock().map_err(|_| StorageError::LockPoisoned)?;

        let Some(cached) = stores.get_mut(&location) else {
            return Ok(());
        };
        cached.open_count = cached.open_count.saturating_sub(1);
        if cached.open_count > 0 || cached.lifecycle == StoreLifecycle::Reactor {
            return Ok(());
        }
        if let Some(cached) = stores.remove(&location) {
            stop_store(&cached.store)?;
        }
        Ok(())
    }

    /// Stop and evict every cached store regardless of lifecycle.
    pub fn close_all(&self) -> Result<(), StorageError> {
        let drained: Vec<CachedStore> = {
            let mut stores = self.stores.lock().map_err(|_| StorageError::LockPoisoned)?;
            stores.drain().map(|(_, cached)| cached).collect()
        };
        for cached in drained {
            stop_store(&cached.store)?;
        }
        Ok(())
    }

    /// Current open count for `config`'s store, `None` if not cached.
    pub fn open_count(&self, config: &StoreConfig) -> Option<usize> {
        let location = StoreLocation::from_uri(config.effective_uri());
        let stores = self.stores.lock().ok()?;
        stores.get(&location).map(|c| c.open_count)
    }
}

fn stop_store(store: &SharedStore) -> Result<(), StorageError> {
    let mut guard = store.lock().map_err(|_| StorageError::LockPoisoned)?;
    guard.stop()
}
