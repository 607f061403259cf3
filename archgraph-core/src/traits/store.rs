//! The transactional property-graph store consumed by scanners and rules.

use crate::errors::StorageError;
use crate::types::{NodeId, QueryParameters, QueryResult, QueryValue};

/// A transactional key-property graph.
///
/// Nodes carry a growing set of labels and a `key` that is unique per label
/// when present. Structural writes are only legal inside a transaction;
/// callers drive `begin_transaction` / `commit_transaction` /
/// `rollback_transaction` explicitly. The trait is object safe so scanners
/// and rule executors can hold a `&mut dyn GraphStore`.
pub trait GraphStore {
    fn start(&mut self) -> Result<(), StorageError>;
    fn stop(&mut self) -> Result<(), StorageError>;
    /// Delete all graph content.
    fn reset(&mut self) -> Result<(), StorageError>;

    fn begin_transaction(&mut self) -> Result<(), StorageError>;
    fn commit_transaction(&mut self) -> Result<(), StorageError>;
    fn rollback_transaction(&mut self) -> Result<(), StorageError>;
    fn has_active_transaction(&self) -> bool;

    /// Mark a point inside the active transaction that later writes can be
    /// undone to. Savepoints nest; `name` must be a plain identifier.
    fn savepoint(&mut self, name: &str) -> Result<(), StorageError>;
    /// Keep the writes made since `savepoint(name)` and forget the mark.
    fn release_savepoint(&mut self, name: &str) -> Result<(), StorageError>;
    /// Undo the writes made since `savepoint(name)` and forget the mark.
    /// The enclosing transaction stays active.
    fn rollback_to_savepoint(&mut self, name: &str) -> Result<(), StorageError>;

    /// Make pending writes of the current transaction visible to queries.
    fn flush(&mut self) -> Result<(), StorageError>;

    /// Create a node with `label`, optionally keyed.
    fn create(&mut self, label: &str, key: Option<&str>) -> Result<NodeId, StorageError>;
    fn find(&self, label: &str, key: &str) -> Result<Option<NodeId>, StorageError>;

    /// Find the node with `label` and `key`, creating it when absent.
    fn merge(&mut self, label: &str, key: &str) -> Result<NodeId, StorageError> {
        match self.find(label, key)? {
            Some(id) => Ok(id),
            None => self.create(label, Some(key)),
        }
    }

    /// Attach an additional label to an existing node.
    fn add_label(&mut self, node: NodeId, label: &str) -> Result<(), StorageError>;
    fn labels(&self, node: NodeId) -> Result<Vec<String>, StorageError>;

    fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: QueryValue,
    ) -> Result<(), StorageError>;
    fn property(&self, node: NodeId, name: &str) -> Result<Option<QueryValue>, StorageError>;

    fn create_relation(
        &mut self,
        from: NodeId,
        relation: &str,
        to: NodeId,
    ) -> Result<(), StorageError>;

    /// Run a query in the store's native language with named parameters.
    fn execute_query(
        &mut self,
        query: &str,
        params: &QueryParameters,
    ) -> Result<QueryResult, StorageError>;
}
