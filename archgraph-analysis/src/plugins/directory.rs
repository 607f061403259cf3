//! Directory plugin: a `Directory` node containing every file and
//! subdirectory below it.

use std::path::Path;

use archgraph_core::errors::ScanError;
use archgraph_core::types::NodeId;

use super::{create_file_node, with_container};
use crate::scanner::{DirectoryEntries, EntrySource, ItemKind, ScanItem, Scanner, ScannerPlugin, Scope};

pub const DIRECTORY_LABEL: &str = "Directory";

pub struct DirectoryPlugin;

impl DirectoryPlugin {
    fn scan_tree(&self, root: &Path, scope: &Scope, scanner: &mut Scanner<'_>) -> Result<(), ScanError> {
        let exclude = scanner.config().exclude.clone();
        let mut entries = DirectoryEntries::with_exclude(root, exclude)?;
        while let Some(entry) = entries.next_entry()? {
            if entry.name.is_empty() {
                continue;
            }
            let path = format!("/{}", entry.name);
            match entry.file {
                None => {
                    create_file_node(scanner, &[DIRECTORY_LABEL], &path)?;
                }
                Some(file) => {
                    scanner.scan(&ScanItem::File(file), &path, scope)?;
                }
            }
        }
        Ok(())
    }
}

impl ScannerPlugin for DirectoryPlugin {
    fn name(&self) -> &str { "directory" }
    fn item_kind(&self) -> ItemKind { ItemKind::Directory }

    fn accepts(&self, item: &ScanItem, _path: &str, _scope: &Scope) -> bool {
        matches!(item, ScanItem::Directory(dir) if dir.is_dir())
    }

    fn scan(
        &self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        let ScanItem::Directory(root) = item else {
            return Ok(None);
        };
        let node = create_file_node(scanner, &[DIRECTORY_LABEL], path)?;
        with_container(scanner, node, |scanner| self.scan_tree(root, scope, scanner))?;
        Ok(Some(node))
    }
}
