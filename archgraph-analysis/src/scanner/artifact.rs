//! Bulk artifact scanning: lazily dispatch every entry of a resource source
//! to the first matching `ArtifactScannerPlugin`.

use std::io::{Read, Seek};
use std::path::Path;

use archgraph_core::errors::ScanError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::NodeId;
use url::Url;

use super::plugin::ArtifactScannerPlugin;
use super::resource::{ArchiveEntries, DirectoryEntries, EntrySource, MemoryEntries, ResourceEntry, UrlEntries};

pub struct ArtifactScanner {
    plugins: Vec<Box<dyn ArtifactScannerPlugin>>,
}

impl ArtifactScanner {
    pub fn new(plugins: Vec<Box<dyn ArtifactScannerPlugin>>) -> Self {
        Self { plugins }
    }

    pub fn scan_archive<'s>(
        &'s self,
        store: &'s mut dyn GraphStore,
        archive: &Path,
    ) -> Result<ArtifactIter<'s, ArchiveEntries<std::fs::File>>, ScanError> {
        Ok(self.scan_entries(store, ArchiveEntries::open(archive)?))
    }

    pub fn scan_archive_reader<'s, R: Read + Seek>(
        &'s self,
        store: &'s mut dyn GraphStore,
        reader: R,
        label: &str,
    ) -> Result<ArtifactIter<'s, ArchiveEntries<R>>, ScanError> {
        Ok(self.scan_entries(store, ArchiveEntries::new(reader, label)?))
    }

    pub fn scan_directory<'s>(
        &'s self,
        store: &'s mut dyn GraphStore,
        directory: &Path,
    ) -> Result<ArtifactIter<'s, DirectoryEntries>, ScanError> {
        Ok(self.scan_entries(store, DirectoryEntries::new(directory)?))
    }

    pub fn scan_urls<'s>(
        &'s self,
        store: &'s mut dyn GraphStore,
        urls: Vec<Url>,
    ) -> ArtifactIter<'s, UrlEntries> {
        self.scan_entries(store, UrlEntries::new(urls))
    }

    /// In-memory class files, keyed by fully-qualified class name.
    pub fn scan_classes<'s>(
        &'s self,
        store: &'s mut dyn GraphStore,
        classes: Vec<(String, Vec<u8>)>,
    ) -> ArtifactIter<'s, MemoryEntries> {
        self.scan_entries(store, MemoryEntries::classes(classes))
    }

    pub fn scan_entries<'s, S: EntrySource>(
        &'s self,
        store: &'s mut dyn GraphStore,
        source: S,
    ) -> ArtifactIter<'s, S> {
        ArtifactIter {
            store,
            plugins: &self.plugins,
            source: Some(source),
            opened_transaction: false,
        }
    }
}

/// Lazy, single-pass iterator over the nodes produced for matched entries.
///
/// Entries no plugin matches, or for which the plugin returns no node, are
/// skipped. All writes share one transaction, opened on the first entry when
/// none is active and committed when the source is exhausted. The source is
/// dropped exactly once: on exhaustion, on the first error, or when the
/// iterator itself is dropped. After an error the iterator is fused.
pub struct ArtifactIter<'s, S: EntrySource> {
    store: &'s mut dyn GraphStore,
    plugins: &'s [Box<dyn ArtifactScannerPlugin>],
    source: Option<S>,
    opened_transaction: bool,
}

impl<S: EntrySource> ArtifactIter<'_, S> {
    fn dispatch(&mut self, entry: &ResourceEntry) -> Result<Option<NodeId>, ScanError> {
        let plugins = self.plugins;
        let Some(plugin) = plugins
            .iter()
            .find(|p| p.matches(&entry.name, entry.is_directory))
        else {
            return Ok(None);
        };

        if !self.opened_transaction && !self.store.has_active_transaction() {
            self.store.begin_transaction()?;
            self.opened_transaction = true;
        }

        if entry.is_directory {
            tracing::debug!(plugin = plugin.name(), name = %entry.name, "scanning directory entry");
            plugin.scan_directory(&mut *self.store, &entry.name)
        } else {
            tracing::info!(plugin = plugin.name(), name = %entry.name, "scanning file");
            match &entry.file {
                Some(file) => plugin.scan_file(&mut *self.store, &entry.name, file),
                None => Ok(None),
            }
        }
    }

    /// Commit the shared transaction (if ours) and release the source.
    fn finish(&mut self) -> Result<(), ScanError> {
        self.source = None;
        if !std::mem::take(&mut self.opened_transaction) {
            return Ok(());
        }
        if let Err(e) = self.store.commit_transaction() {
            if self.store.has_active_transaction() {
                if let Err(rollback_err) = self.store.rollback_transaction() {
                    tracing::warn!(error = %rollback_err, "rollback after failed commit failed");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.source = None;
        if std::mem::take(&mut self.opened_transaction) && self.store.has_active_transaction() {
            if let Err(e) = self.store.rollback_transaction() {
                tracing::warn!(error = %e, "rollback after failed artifact scan failed");
            }
        }
    }
}

impl<S: EntrySource> Iterator for ArtifactIter<'_, S> {
    type Item = Result<NodeId, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let source = self.source.as_mut()?;
            let entry = match source.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => return self.finish().err().map(Err),
                Err(e) => {
                    self.abort();
                    return Some(Err(e));
                }
            };

            match self.dispatch(&entry) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(e) => {
                    self.abort();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<S: EntrySource> Drop for ArtifactIter<'_, S> {
    fn drop(&mut self) {
        // Early termination keeps what was already handed out.
        if let Err(e) = self.finish() {
            tracing::warn!(error = %e, "commit of partially consumed artifact scan failed");
        }
    }
}
