//! Built-in scanner plugins.
//!
//! Registration order decides which plugin wins a path: URLs, directories,
//! archives, then the document formats.

pub mod archive;
pub mod directory;
pub mod document;
pub mod json;
pub mod properties;
pub mod url;
pub mod yaml;

use std::collections::BTreeMap;

use archgraph_core::errors::ScanError;
use archgraph_core::types::NodeId;

use crate::scanner::{ArtifactPluginAdapter, Container, PluginRegistry, Scanner, Scope, CONTAINS};

pub use archive::ArchivePlugin;
pub use directory::DirectoryPlugin;
pub use json::JsonPlugin;
pub use properties::PropertiesPlugin;
pub use url::UrlPlugin;
pub use yaml::YamlPlugin;

/// Label every scanned file node carries.
pub const FILE_LABEL: &str = "File";
/// Property holding a file node's path within its container.
pub const FILE_NAME: &str = "fileName";

/// Scope for class-path style containers (class folders, JARs).
pub fn classpath_scope() -> Scope {
    Scope::new("java", "classpath")
}

/// All built-in plugins, configured with `properties`.
pub fn default_registry(properties: &BTreeMap<String, String>) -> Result<PluginRegistry, ScanError> {
    let mut registry = PluginRegistry::new();
    registry.register_scope(classpath_scope());
    registry.register(Box::new(UrlPlugin), properties)?;
    registry.register(Box::new(DirectoryPlugin), properties)?;
    registry.register(Box::new(ArchivePlugin), properties)?;
    registry.register(Box::new(JsonPlugin::default()), properties)?;
    registry.register(Box::new(YamlPlugin::default()), properties)?;
    registry.register(Box::new(ArtifactPluginAdapter::new(PropertiesPlugin)), properties)?;
    Ok(registry)
}

/// Create a `File` node with extra `labels`, attached to the current container.
pub fn create_file_node(
    scanner: &mut Scanner<'_>,
    labels: &[&str],
    file_name: &str,
) -> Result<NodeId, ScanError> {
    let container = scanner.context().try_peek::<Container>().copied();
    let store = scanner.context().store();
    let node = store.create(FILE_LABEL, None)?;
    for label in labels {
        store.add_label(node, label)?;
    }
    store.set_property(node, FILE_NAME, file_name.into())?;
    if let Some(Container(parent)) = container {
        store.create_relation(parent, CONTAINS, node)?;
    }
    Ok(node)
}

/// Run `scan` with `container` pushed on the scanner context. The container
/// is popped again whatever `scan` returns.
pub(crate) fn with_container<T>(
    scanner: &mut Scanner<'_>,
    container: NodeId,
    scan: impl FnOnce(&mut Scanner<'_>) -> Result<T, ScanError>,
) -> Result<T, ScanError> {
    scanner.context().push(Container(container));
    let result = scan(scanner);
    scanner.context().pop::<Container>()?;
    result
}

/// Case-insensitive extension check on a scan path.
pub(crate) fn has_extension(path: &str, extensions: &[String]) -> bool {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Comma-separated extension list from a plugin property, if set.
pub(crate) fn extensions_property(
    properties: &BTreeMap<String, String>,
    key: &str,
) -> Option<Vec<String>> {
    properties.get(key).map(|value| {
        value
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_ignores_case() {
        let exts = vec!["yaml".to_string(), "yml".to_string()];
        assert!(has_extension("/config/app.YML", &exts));
        assert!(!has_extension("/config/app.json", &exts));
        assert!(!has_extension("/Makefile", &exts));
    }

    #[test]
    fn parses_extension_property() {
        let mut props = BTreeMap::new();
        props.insert("json.extensions".to_string(), ".json, geojson,".to_string());
        assert_eq!(
            extensions_property(&props, "json.extensions"),
            Some(vec!["json".to_string(), "geojson".to_string()])
        );
        assert_eq!(extensions_property(&props, "yaml.extensions"), None);
    }
}
