//! YAML plugin. A file may hold several `---` separated documents.

use std::collections::BTreeMap;

use archgraph_core::errors::ScanError;
use archgraph_core::types::{NodeId, QueryValue};
use serde::Deserialize;
use serde_yaml::Value;

use super::document::{write_documents, DocKey, DocNode};
use super::{create_file_node, extensions_property, has_extension};
use crate::scanner::{ItemKind, ScanItem, Scanner, ScannerPlugin, Scope};

pub const EXTENSIONS_PROPERTY: &str = "yaml.extensions";

const MERGE_KEY: &str = "<<";

pub struct YamlPlugin {
    extensions: Vec<String>,
}

impl Default for YamlPlugin {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string(), "yml".to_string()],
        }
    }
}

fn scalar(value: &Value) -> Option<QueryValue> {
    Some(match value {
        Value::Null => QueryValue::Null,
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => QueryValue::Integer(i),
            None => QueryValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => s.as_str().into(),
        _ => return None,
    })
}

fn to_doc_key(key: Value) -> DocKey {
    match key {
        Value::String(s) if s == MERGE_KEY => DocKey::Merge,
        Value::String(s) => DocKey::Simple(s),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => DocKey::Complex(Box::new(to_doc_node(key))),
        other => match scalar(&other) {
            Some(QueryValue::Null) | None => DocKey::Simple(String::new()),
            Some(value) => DocKey::Simple(value.to_string()),
        },
    }
}

pub(crate) fn to_doc_node(value: Value) -> DocNode {
    match value {
        Value::Sequence(items) => DocNode::Sequence(items.into_iter().map(to_doc_node).collect()),
        Value::Mapping(map) => DocNode::Mapping(
            map.into_iter()
                .map(|(k, v)| (to_doc_key(k), to_doc_node(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => to_doc_node(tagged.value),
        other => DocNode::Scalar(scalar(&other).unwrap_or(QueryValue::Null)),
    }
}

/// Parse every document in `text`.
pub(crate) fn parse_documents(path: &str, text: &str) -> Result<Vec<DocNode>, ScanError> {
    serde_yaml::Deserializer::from_str(text)
        .map(|document| {
            Value::deserialize(document)
                .map(to_doc_node)
                .map_err(|e| ScanError::ParseError {
                    path: path.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

impl ScannerPlugin for YamlPlugin {
    fn name(&self) -> &str { "yaml" }
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
        let documents = parse_documents(path, &file.read_to_string()?)?;

        let node = create_file_node(scanner, &["Yaml"], path)?;
        write_documents(scanner.context().store(), node, &documents)?;
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keys_are_kept_for_the_writer() {
        let docs = parse_documents(
            "/a.yaml",
            "base: &base\n  x: 1\nderived:\n  <<: *base\n  y: 2\n---\n- a\n",
        )
        .unwrap();
        assert_eq!(docs.len(), 2);
        let DocNode::Mapping(entries) = &docs[0] else {
            panic!("expected mapping");
        };
        let DocNode::Mapping(derived) = &entries[1].1 else {
            panic!("expected mapping");
        };
        assert_eq!(derived[0].0, DocKey::Merge);
        assert!(matches!(docs[1], DocNode::Sequence(_)));
    }

    #[test]
    fn invalid_yaml_names_the_path() {
        let err = parse_documents("/broken.yaml", "a: [1, 2").unwrap_err();
        assert!(err.to_string().contains("/broken.yaml"));
    }
}
