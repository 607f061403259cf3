//! Scanner plugin traits.

use std::collections::BTreeMap;

use archgraph_core::errors::ScanError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::NodeId;

use super::engine::Scanner;
use super::scope::Scope;
use super::types::{Container, FileResource, ItemKind, ScanItem, CONTAINS};

/// Turns one kind of item into graph nodes.
///
/// The scanner offers an item to the plugins registered for its kind in
/// registration order; the first one whose `accepts` returns true scans it.
/// Plugins may hand nested items back to `scanner.scan`.
pub trait ScannerPlugin {
    fn name(&self) -> &str;

    /// The item kind this plugin handles; also its registration tag.
    fn item_kind(&self) -> ItemKind;

    /// Receives the scan properties once, at registration.
    fn configure(&mut self, _properties: &BTreeMap<String, String>) -> Result<(), ScanError> {
        Ok(())
    }

    fn accepts(&self, item: &ScanItem, path: &str, scope: &Scope) -> bool;

    /// Scan `item`, returning the node that describes it, if any.
    fn scan(
        &self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError>;
}

/// Name-matching plugin used by the artifact scanner's bulk iteration.
pub trait ArtifactScannerPlugin {
    fn name(&self) -> &str;

    fn matches(&self, name: &str, is_directory: bool) -> bool;

    fn scan_file(
        &self,
        store: &mut dyn GraphStore,
        name: &str,
        file: &FileResource,
    ) -> Result<Option<NodeId>, ScanError>;

    fn scan_directory(
        &self,
        _store: &mut dyn GraphStore,
        _name: &str,
    ) -> Result<Option<NodeId>, ScanError> {
        Ok(None)
    }
}

/// Exposes an `ArtifactScannerPlugin` to the main scanner as a file plugin.
/// Nodes it produces are attached to the current `Container`, if any.
pub struct ArtifactPluginAdapter<P> {
    inner: P,
}

impl<P: ArtifactScannerPlugin> ArtifactPluginAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: ArtifactScannerPlugin> ScannerPlugin for ArtifactPluginAdapter<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::File
    }

    fn accepts(&self, item: &ScanItem, path: &str, _scope: &Scope) -> bool {
        matches!(item, ScanItem::File(_)) && self.inner.matches(path, false)
    }

    fn scan(
        &self,
        item: &ScanItem,
        path: &str,
        _scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        let ScanItem::File(file) = item else {
            return Ok(None);
        };
        let container = scanner.context().try_peek::<Container>().copied();
        let store = scanner.context().store();
        let node = self.inner.scan_file(store, path, file)?;
        if let (Some(node), Some(Container(parent))) = (node, container) {
            store.create_relation(parent, CONTAINS, node)?;
        }
        Ok(node)
    }
}
