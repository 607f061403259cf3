//! `.properties` files: one `Property` node per key/value pair.
//!
//! Implemented as an artifact plugin, so it serves both the bulk artifact
//! scanner and, through `ArtifactPluginAdapter`, the main scanner.

use archgraph_core::errors::ScanError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::NodeId;

use super::{FILE_LABEL, FILE_NAME};
use crate::scanner::{ArtifactScannerPlugin, FileResource};

pub const HAS_PROPERTY: &str = "HAS_PROPERTY";

pub struct PropertiesPlugin;

/// Parse `key=value` / `key: value` lines. `#` and `!` start comments and a
/// trailing backslash continues the value on the next line.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut logical = String::new();
    for line in text.lines() {
        let line = line.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        match line.strip_suffix('\\') {
            Some(continued) => {
                logical.push_str(continued);
                continue;
            }
            None => logical.push_str(line),
        }
        pairs.push(split_pair(&logical));
        logical.clear();
    }
    if !logical.is_empty() {
        pairs.push(split_pair(&logical));
    }
    pairs
}

fn split_pair(line: &str) -> (String, String) {
    match line.find(['=', ':']) {
        Some(at) => (line[..at].trim().to_string(), line[at + 1..].trim().to_string()),
        None => (line.trim().to_string(), String::new()),
    }
}

impl ArtifactScannerPlugin for PropertiesPlugin {
    fn name(&self) -> &str { "properties" }

    fn matches(&self, name: &str, is_directory: bool) -> bool {
        !is_directory && name.to_ascii_lowercase().ends_with(".properties")
    }

    fn scan_file(
        &self,
        store: &mut dyn GraphStore,
        name: &str,
        file: &FileResource,
    ) -> Result<Option<NodeId>, ScanError> {
        let text = file.read_to_string()?;
        let node = store.create(FILE_LABEL, None)?;
        store.add_label(node, "Properties")?;
        store.set_property(node, FILE_NAME, name.into())?;
        for (key, value) in parse_properties(&text) {
            let property = store.create("Property", None)?;
            store.set_property(property, "name", key.into())?;
            store.set_property(property, "value", value.into())?;
            store.create_relation(node, HAS_PROPERTY, property)?;
        }
        Ok(Some(node))
    }
}
