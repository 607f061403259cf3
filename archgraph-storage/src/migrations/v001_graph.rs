//! V001: property-graph tables.

pub const MIGRATION_SQL: &str = r#"
-- Nodes: identity plus the optional full-qualified key.
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT
) STRICT;

-- Labels: a node's type tags. Grows after creation; carries the node key
-- so that keys can be unique per label.
CREATE TABLE IF NOT EXISTS node_labels (
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    key TEXT,
    PRIMARY KEY (node_id, label)
) STRICT;

CREATE UNIQUE INDEX IF NOT EXISTS idx_node_labels_label_key
    ON node_labels(label, key) WHERE key IS NOT NULL;

-- Properties: one typed value per (node, name).
CREATE TABLE IF NOT EXISTS node_properties (
    node_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value ANY,
    PRIMARY KEY (node_id, name)
) STRICT;

-- Relationships: typed, directed edges.
CREATE TABLE IF NOT EXISTS relationships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    to_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE
) STRICT;
"#;
