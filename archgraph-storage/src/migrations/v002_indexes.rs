//! V002: lookup indexes for rule queries.

pub const MIGRATION_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_node_labels_label ON node_labels(label);
CREATE INDEX IF NOT EXISTS idx_node_properties_name_value ON node_properties(name, value);
CREATE INDEX IF NOT EXISTS idx_relationships_from ON relationships(from_id, type);
CREATE INDEX IF NOT EXISTS idx_relationships_to ON relationships(to_id, type);
"#;
