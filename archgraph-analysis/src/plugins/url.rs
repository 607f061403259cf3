//! URL plugin: resolves `file:` URLs and hands the target back to the scanner.

use archgraph_core::errors::ScanError;
use archgraph_core::types::NodeId;

use crate::scanner::resource::url_to_path;
use crate::scanner::{ItemKind, ScanItem, Scanner, ScannerPlugin, Scope};

pub struct UrlPlugin;

impl ScannerPlugin for UrlPlugin {
    fn name(&self) -> &str { "url" }
    fn item_kind(&self) -> ItemKind { ItemKind::Url }

    fn accepts(&self, item: &ScanItem, _path: &str, _scope: &Scope) -> bool {
        matches!(item, ScanItem::Url(url) if url.scheme() == "file")
    }

    fn scan(
        &self,
        item: &ScanItem,
        _path: &str,
        scope: &Scope,
        scanner: &mut Scanner<'_>,
    ) -> Result<Option<NodeId>, ScanError> {
        let ScanItem::Url(url) = item else {
            return Ok(None);
        };
        let target = url_to_path(url)?;
        let nested = if target.is_dir() {
            ScanItem::Directory(target)
        } else {
            ScanItem::file(target)
        };
        scanner.scan(&nested, url.path(), scope)
    }
}
