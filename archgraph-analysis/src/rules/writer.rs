//! Rule set export.

use std::path::Path;

use archgraph_core::errors::RuleError;

use super::document::RuleDocument;
use super::model::RuleSet;

pub struct RuleSetWriter;

impl RuleSetWriter {
    /// The rule set as a TOML rule file.
    pub fn to_toml(rule_set: &RuleSet) -> Result<String, RuleError> {
        toml::to_string_pretty(&RuleDocument::from_rule_set(rule_set)).map_err(|e| RuleError::WriteFailed {
            message: e.to_string(),
        })
    }

    pub fn write(rule_set: &RuleSet, path: &Path) -> Result<(), RuleError> {
        let content = Self::to_toml(rule_set)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RuleError::WriteFailed {
                message: format!("{}: {e}", parent.display()),
            })?;
        }
        std::fs::write(path, content).map_err(|e| RuleError::WriteFailed {
            message: format!("{}: {e}", path.display()),
        })?;
        tracing::info!(path = %path.display(), rules = rule_set.len(), "exported rules");
        Ok(())
    }
}
