//! Structured-document graph model shared by the JSON and YAML plugins.
//!
//! A parsed document is converted into `DocNode`s first, then written with a
//! single recursive `traverse`. Values merged in through a YAML `<<` key are
//! written in `Mode::Merged`, which tags every node they produce.

use archgraph_core::errors::StorageError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::{NodeId, QueryValue};

pub const DOCUMENT_LABEL: &str = "Document";
pub const CONTAINS_DOCUMENT: &str = "CONTAINS_DOCUMENT";
pub const HAS_KEY: &str = "HAS_KEY";
pub const HAS_VALUE: &str = "HAS_VALUE";
pub const CONTAINS_VALUE: &str = "CONTAINS_VALUE";

/// One node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Scalar(QueryValue),
    Sequence(Vec<DocNode>),
    Mapping(Vec<(DocKey, DocNode)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocKey {
    Simple(String),
    /// A key that is itself a sequence or mapping.
    Complex(Box<DocNode>),
    /// YAML `<<`: the value's entries belong to the enclosing mapping.
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Standard,
    Merged,
}

/// Write each document below `file` and return the document nodes.
pub fn write_documents(
    store: &mut dyn GraphStore,
    file: NodeId,
    documents: &[DocNode],
) -> Result<Vec<NodeId>, StorageError> {
    let mut nodes = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let doc = store.create(DOCUMENT_LABEL, None)?;
        store.set_property(doc, "index", QueryValue::from(index as i64))?;
        store.create_relation(file, CONTAINS_DOCUMENT, doc)?;
        let root = traverse(store, document, Mode::Standard)?;
        store.create_relation(doc, CONTAINS_VALUE, root)?;
        nodes.push(doc);
    }
    Ok(nodes)
}

/// Write `node` and everything below it, returning the node created for it.
pub fn traverse(store: &mut dyn GraphStore, node: &DocNode, mode: Mode) -> Result<NodeId, StorageError> {
    match node {
        DocNode::Scalar(value) => {
            let id = value_node(store, "Scalar", mode)?;
            if !value.is_null() {
                store.set_property(id, "value", value.clone())?;
            }
            Ok(id)
        }
        DocNode::Sequence(items) => {
            let id = value_node(store, "Sequence", mode)?;
            let last = items.len().saturating_sub(1);
            for (index, item) in items.iter().enumerate() {
                let child = traverse(store, item, mode)?;
                store.add_label(child, "Item")?;
                store.set_property(child, "index", QueryValue::from(index as i64))?;
                if index == 0 {
                    store.add_label(child, "First")?;
                }
                if index == last {
                    store.add_label(child, "Last")?;
                }
                store.create_relation(id, CONTAINS_VALUE, child)?;
            }
            Ok(id)
        }
        DocNode::Mapping(entries) => {
            let id = value_node(store, "Map", mode)?;
            write_entries(store, id, entries, mode)?;
            Ok(id)
        }
    }
}

fn write_entries(
    store: &mut dyn GraphStore,
    map: NodeId,
    entries: &[(DocKey, DocNode)],
    mode: Mode,
) -> Result<(), StorageError> {
    for (key, value) in entries {
        match (key, value) {
            (DocKey::Merge, DocNode::Mapping(merged)) => {
                write_entries(store, map, merged, Mode::Merged)?;
            }
            (DocKey::Merge, DocNode::Sequence(items))
                if items.iter().all(|i| matches!(i, DocNode::Mapping(_))) =>
            {
                for item in items {
                    if let DocNode::Mapping(merged) = item {
                        write_entries(store, map, merged, Mode::Merged)?;
                    }
                }
            }
            _ => {
                let key_id = key_node(store, key, mode)?;
                store.create_relation(map, HAS_KEY, key_id)?;
                let value_id = traverse(store, value, mode)?;
                store.create_relation(key_id, HAS_VALUE, value_id)?;
            }
        }
    }
    Ok(())
}

fn key_node(store: &mut dyn GraphStore, key: &DocKey, mode: Mode) -> Result<NodeId, StorageError> {
    let id = store.create("Key", None)?;
    tag_merged(store, id, mode)?;
    match key {
        DocKey::Simple(name) => store.set_property(id, "name", name.as_str().into())?,
        DocKey::Merge => {
            // A `<<` whose value cannot be merged stays an ordinary key.
            store.add_label(id, "MergeKey")?;
            store.set_property(id, "name", "<<".into())?;
        }
        DocKey::Complex(content) => {
            store.add_label(id, "ComplexKey")?;
            let content = traverse(store, content, mode)?;
            store.create_relation(id, CONTAINS_VALUE, content)?;
        }
    }
    Ok(id)
}

fn value_node(store: &mut dyn GraphStore, kind: &str, mode: Mode) -> Result<NodeId, StorageError> {
    let id = store.create("Value", None)?;
    store.add_label(id, kind)?;
    tag_merged(store, id, mode)?;
    Ok(id)
}

fn tag_merged(store: &mut dyn GraphStore, id: NodeId, mode: Mode) -> Result<(), StorageError> {
    if mode == Mode::Merged {
        store.add_label(id, "Merged")?;
    }
    Ok(())
}
