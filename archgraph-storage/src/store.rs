//! `SqliteGraphStore`: the `GraphStore` implementation over SQLite.

use std::path::{Path, PathBuf};

use archgraph_core::constants::IN_MEMORY_STORE_URI;
use archgraph_core::errors::StorageError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::{NodeId, QueryParameters, QueryResult, QueryValue};
use rusqlite::Connection;

use crate::connection::{pragmas, transaction};
use crate::migrations;
use crate::queries::{labels, native, nodes, properties, relationships};

/// Where a store keeps its database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// `:memory:` (or an empty string) selects memory; anything else is a file path.
    pub fn from_uri(uri: &str) -> Self {
        let uri = uri.trim();
        if uri.is_empty() || uri == IN_MEMORY_STORE_URI {
            Self::Memory
        } else {
            Self::File(PathBuf::from(uri.strip_prefix("file:").unwrap_or(uri)))
        }
    }
}

/// SQLite-backed property graph. Unusable until `start` is called.
pub struct SqliteGraphStore {
    location: StoreLocation,
    conn: Option<Connection>,
}

impl SqliteGraphStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn open_file(path: impl AsRef<Path>) -> Self {
        Self::new(StoreLocation::File(path.as_ref().to_path_buf()))
    }

    /// Create and start an in-memory store.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let mut store = Self::in_memory();
        store.start()?;
        Ok(store)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_started(&self) -> bool {
        self.conn.is_some()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> Result<i64, StorageError> {
        nodes::count_nodes(self.conn()?)
    }

    /// Number of nodes tagged with `label`.
    pub fn count_labeled(&self, label: &str) -> Result<i64, StorageError> {
        labels::count_with_label(self.conn()?, label)
    }

    /// Targets of `node`'s outgoing `relation` edges, in creation order.
    pub fn outgoing(&self, node: NodeId, relation: &str) -> Result<Vec<NodeId>, StorageError> {
        relationships::outgoing(self.conn()?, node, relation)
    }

    /// Direct access to the connection, for diagnostics and tests.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        f(self.conn()?)
    }

    fn conn(&self) -> Result<&Connection, StorageError> {
        self.conn.as_ref().ok_or(StorageError::NotStarted)
    }

    fn write_conn(&self) -> Result<&Connection, StorageError> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            return Err(StorageError::NoActiveTransaction);
        }
        Ok(conn)
    }
}

impl GraphStore for SqliteGraphStore {
    fn start(&mut self) -> Result<(), StorageError> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = match &self.location {
            StoreLocation::Memory => Connection::open_in_memory(),
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                        message: format!("cannot create {}: {e}", parent.display()),
                    })?;
                }
                Connection::open(path)
            }
        }
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

        pragmas::apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        tracing::info!(location = ?self.location, "graph store started");
        self.conn = Some(conn);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StorageError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if !conn.is_autocommit() {
            tracing::warn!("stopping store with an open transaction, rolling back");
            transaction::rollback(&conn)?;
        }
        pragmas::optimize_on_close(&conn)?;
        conn.close().map_err(|(_, e)| StorageError::SqliteError { message: e.to_string() })?;
        tracing::info!(location = ?self.location, "graph store stopped");
        Ok(())
    }

    fn reset(&mut self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            transaction::with_immediate_transaction(conn, nodes::delete_all)?;
        } else {
            nodes::delete_all(conn)?;
        }
        tracing::info!("graph store reset");
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        transaction::begin_immediate(self.conn()?)
    }

    fn commit_transaction(&mut self) -> Result<(), StorageError> {
        transaction::commit(self.conn()?)
    }

    fn rollback_transaction(&mut self) -> Result<(), StorageError> {
        transaction::rollback(self.conn()?)
    }

    fn has_active_transaction(&self) -> bool {
        self.conn.as_ref().is_some_and(|c| !c.is_autocommit())
    }

    fn savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        transaction::savepoint(self.conn()?, name)
    }

    fn release_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        transaction::release_savepoint(self.write_conn()?, name)
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        transaction::rollback_to_savepoint(self.write_conn()?, name)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        // One connection sees its own uncommitted writes.
        self.conn().map(|_| ())
    }

    fn create(&mut self, label: &str, key: Option<&str>) -> Result<NodeId, StorageError> {
        let conn = self.write_conn()?;
        if let Some(key) = key {
            if nodes::find_by_label_and_key(conn, label, key)?.is_some() {
                return Err(StorageError::DuplicateKey {
                    label: label.to_string(),
                    key: key.to_string(),
                });
            }
        }
        let id = nodes::insert_node(conn, key)?;
        labels::add_label(conn, id, label)?;
        Ok(id)
    }

    fn find(&self, label: &str, key: &str) -> Result<Option<NodeId>, StorageError> {
        nodes::find_by_label_and_key(self.conn()?, label, key)
    }

    fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), StorageError> {
        labels::add_label(self.write_conn()?, node, label)
    }

    fn labels(&self, node: NodeId) -> Result<Vec<String>, StorageError> {
        labels::labels_of(self.conn()?, node)
    }

    fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: QueryValue,
    ) -> Result<(), StorageError> {
        properties::upsert_property(self.write_conn()?, node, name, &value)
    }

    fn property(&self, node: NodeId, name: &str) -> Result<Option<QueryValue>, StorageError> {
        properties::get_property(self.conn()?, node, name)
    }

    fn create_relation(
        &mut self,
        from: NodeId,
        relation: &str,
        to: NodeId,
    ) -> Result<(), StorageError> {
        relationships::insert_relationship(self.write_conn()?, from, relation, to)
    }

    fn execute_query(
        &mut self,
        query: &str,
        params: &QueryParameters,
    ) -> Result<QueryResult, StorageError> {
        native::execute_query(self.conn()?, query, params)
    }
}

impl Drop for SqliteGraphStore {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "failed to stop graph store on drop");
        }
    }
}
