//! Archive plugin: ZIP-based files (`.zip`, `.jar`, `.war`, `.ear`).
//!
//! Entries are offered to the scanner as in-memory files, so an archive
//! nested in another archive is scanned by this same plugin.

use std::io::Cursor;

use archgraph_core::errors::ScanError;
use archgraph_core::types::NodeId;

use super::directory::DIRECTORY_LABEL;
use super::{create_file_node, with_container};
use crate::scanner::{
    ArchiveEntries, EntrySource, FileResource, ItemKind, ScanItem, Scanner, ScannerPlugin, Scope,
};

pub const ARCHIVE_LABEL: &str = "Archive";

const ARCHIVE_TYPES: [(&str, &str); 4] = [("zip", "Zip"), ("jar", "Jar"), ("war", "War"), ("ear", "Ear")];

fn archive_label(path: &str) -> Option<&'static str> {
    let (_, ext) = path.rsplit_once('.')?;
    ARCHIVE_TYPES
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, label)| *label)
}

pub struct ArchivePlugin;

impl ArchivePlugin {
    fn scan_archive<S: EntrySource>(
        &self,
        entries: S,
        path: &str,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<NodeId, ScanError> {
        let labels: Vec<&str> = std::iter::once(ARCHIVE_LABEL).chain(archive_label(path)).collect();
        let node = create_file_node(scanner, &labels, path)?;
        with_container(scanner, node, |scanner| self.scan_entries(entries, scope, scanner))?;
        Ok(node)
    }

    fn scan_entries<S: EntrySource>(
        &self,
        mut entries: S,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<(), ScanError> {
        while let Some(entry) = entries.next_entry()? {
            let path = format!("/{}", entry.name.trim_end_matches('/'));
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

impl ScannerPlugin for ArchivePlugin {
    fn name(&self) -> &str { "archive" }
    fn item_kind(&self) -> ItemKind { ItemKind::File }

    fn accepts(&self, item: &ScanItem, path: &str, _scope: &Scope) -> bool {
        matches!(item, ScanItem::File(_)) && archive_label(path).is_some()
    }

    fn scan(
        &self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        let ScanItem::File(file) = item else {
            return Ok(None);
        };
        // Open first: an unreadable archive must not leave a node behind.
        let node = match file {
            FileResource::Path(archive) => self.scan_archive(ArchiveEntries::open(archive)?, path, scope, scanner)?,
            FileResource::Bytes { name, data } => {
                let entries = ArchiveEntries::new(Cursor::new(data.clone()), name.clone())?;
                self.scan_archive(entries, path, scope, scanner)?
            }
        };
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_by_extension() {
        assert_eq!(archive_label("/lib/app.JAR"), Some("Jar"));
        assert_eq!(archive_label("/deploy/app.war"), Some("War"));
        assert_eq!(archive_label("/notes.txt"), None);
    }
}
