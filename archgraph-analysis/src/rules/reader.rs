//! Rule source readers and the parser that dispatches sources to them.

use archgraph_core::config::RuleConfig;
use archgraph_core::errors::RuleError;

use super::document::RuleDocument;
use super::model::{RuleSet, RuleSetBuilder};
use super::source::{RuleFormat, RuleSource};

/// Reads the rules of one source format into a `RuleSetBuilder`.
pub trait RuleSourceReader {
    fn accepts(&self, source: &RuleSource) -> bool;

    fn read(&self, source: &RuleSource, builder: &mut RuleSetBuilder) -> Result<(), RuleError>;
}

fn parse_error(source: &RuleSource, message: impl ToString) -> RuleError {
    RuleError::ParseError {
        source_id: source.id(),
        message: message.to_string(),
    }
}

pub struct TomlRuleReader;

impl RuleSourceReader for TomlRuleReader {
    fn accepts(&self, source: &RuleSource) -> bool {
        source.format() == Some(RuleFormat::Toml)
    }

    fn read(&self, source: &RuleSource, builder: &mut RuleSetBuilder) -> Result<(), RuleError> {
        let content = source.read_content()?;
        let document: RuleDocument = toml::from_str(&content).map_err(|e| parse_error(source, e))?;
        document.check_parameters().map_err(|e| parse_error(source, e))?;
        document.add_to(builder)
    }
}

/// YAML rule files. A file may hold several documents.
pub struct YamlRuleReader;

impl RuleSourceReader for YamlRuleReader {
    fn accepts(&self, source: &RuleSource) -> bool {
        source.format() == Some(RuleFormat::Yaml)
    }

    fn read(&self, source: &RuleSource, builder: &mut RuleSetBuilder) -> Result<(), RuleError> {
        use serde::Deserialize;

        let content = source.read_content()?;
        for part in serde_yaml::Deserializer::from_str(&content) {
            let value = serde_yaml::Value::deserialize(part).map_err(|e| parse_error(source, e))?;
            if value.is_null() {
                continue;
            }
            let document: RuleDocument =
                serde_yaml::from_value(value).map_err(|e| parse_error(source, e))?;
            document.check_parameters().map_err(|e| parse_error(source, e))?;
            document.add_to(builder)?;
        }
        Ok(())
    }
}

/// Reads rule sources into a `RuleSet`, each with the first reader that
/// accepts it.
pub struct RuleParser {
    readers: Vec<Box<dyn RuleSourceReader>>,
}

impl Default for RuleParser {
    fn default() -> Self {
        Self::with_readers(vec![Box::new(TomlRuleReader), Box::new(YamlRuleReader)])
    }
}

impl RuleParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readers(readers: Vec<Box<dyn RuleSourceReader>>) -> Self {
        Self { readers }
    }

    pub fn parse(&self, sources: &[RuleSource], config: &RuleConfig) -> Result<RuleSet, RuleError> {
        let mut builder = RuleSetBuilder::new(config);
        for source in sources {
            let reader = self
                .readers
                .iter()
                .find(|r| r.accepts(source))
                .ok_or_else(|| RuleError::NoReaderForSource {
                    source_id: source.id(),
                })?;
            tracing::debug!(source = %source, "reading rules");
            reader.read(source, &mut builder)?;
        }
        let rule_set = builder.build();
        tracing::info!(sources = sources.len(), rules = rule_set.len(), "loaded rules");
        Ok(rule_set)
    }

    /// Read every rule file in the configured rule directories.
    pub fn parse_directories(&self, config: &RuleConfig) -> Result<RuleSet, RuleError> {
        let mut sources = Vec::new();
        for directory in &config.directories {
            sources.extend(RuleSource::from_directory(directory)?);
        }
        self.parse(&sources, config)
    }
}
