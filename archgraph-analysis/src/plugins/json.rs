//! JSON plugin.

use std::collections::BTreeMap;

use archgraph_core::errors::ScanError;
use archgraph_core::types::{NodeId, QueryValue};
use serde_json::Value;

use super::document::{write_documents, DocKey, DocNode};
use super::{create_file_node, extensions_property, has_extension};
use crate::scanner::{ItemKind, ScanItem, Scanner, ScannerPlugin, Scope};

/// Overrides the handled extensions, e.g. `json, geojson`.
pub const EXTENSIONS_PROPERTY: &str = "json.extensions";

pub struct JsonPlugin {
    extensions: Vec<String>,
}

impl Default for JsonPlugin {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
        }
    }
}

pub(crate) fn to_doc_node(value: Value) -> DocNode {
    match value {
        Value::Null => DocNode::Scalar(QueryValue::Null),
        Value::Bool(b) => DocNode::Scalar(b.into()),
        Value::Number(n) => DocNode::Scalar(match n.as_i64() {
            Some(i) => QueryValue::Integer(i),
            None => QueryValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::String(s) => DocNode::Scalar(s.into()),
        Value::Array(items) => DocNode::Sequence(items.into_iter().map(to_doc_node).collect()),
        Value::Object(map) => DocNode::Mapping(
            map.into_iter()
                .map(|(k, v)| (DocKey::Simple(k), to_doc_node(v)))
                .collect(),
        ),
    }
}

impl ScannerPlugin for JsonPlugin {
    fn name(&self) -> &str { "json" }
    fn item_kind(&self) -> ItemKind { ItemKind::File }

    fn configure(&mut self, properties: &BTreeMap<String, String>) -> Result<(), ScanError> {
        if let Some(extensions) = extensions_property(properties, EXTENSIONS_PROPERTY) {
            self.extensions = extensions;
        }
        Ok(())
    }

    fn accepts(&self, item: &ScanItem, path: &str, _scope: &Scope) -> bool {
        matches!(item, ScanItem::File(_)) && has_extension(path, &self.extensions)
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
        let text = file.read_to_string()?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ScanError::ParseError {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let node = create_file_node(scanner, &["Json"], path)?;
        write_documents(scanner.context().store(), node, &[to_doc_node(value)])?;
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_numbers_and_nesting() {
        let value: Value = serde_json::from_str(r#"{"a": [1, 2.5], "b": null}"#).unwrap();
        assert_eq!(
            to_doc_node(value),
            DocNode::Mapping(vec![
                (
                    DocKey::Simple("a".into()),
                    DocNode::Sequence(vec![
                        DocNode::Scalar(QueryValue::Integer(1)),
                        DocNode::Scalar(QueryValue::Real(2.5)),
                    ])
                ),
                (DocKey::Simple("b".into()), DocNode::Scalar(QueryValue::Null)),
            ])
        );
    }
}
