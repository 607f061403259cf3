//! Where rules come from: rule files or inline text.

use std::fmt;
use std::path::{Path, PathBuf};

use archgraph_core::errors::RuleError;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Toml,
    Yaml,
}

impl RuleFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    File(PathBuf),
    Inline {
        id: String,
        format: RuleFormat,
        content: String,
    },
}

impl RuleSource {
    pub fn inline(id: impl Into<String>, format: RuleFormat, content: impl Into<String>) -> Self {
        Self::Inline {
            id: id.into(),
            format,
            content: content.into(),
        }
    }

    /// Identifier used in error messages and logs.
    pub fn id(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline { id, .. } => id.clone(),
        }
    }

    /// Format implied by the file extension or declared inline.
    pub fn format(&self) -> Option<RuleFormat> {
        match self {
            Self::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(RuleFormat::from_extension),
            Self::Inline { format, .. } => Some(*format),
        }
    }

    pub fn read_content(&self) -> Result<String, RuleError> {
        match self {
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| RuleError::SourceRead {
                source_id: self.id(),
                message: e.to_string(),
            }),
            Self::Inline { content, .. } => Ok(content.clone()),
        }
    }

    /// Every rule file below `directory`, sorted by path.
    pub fn from_directory(directory: &Path) -> Result<Vec<Self>, RuleError> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry.map_err(|e| RuleError::SourceRead {
                source_id: directory.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source = Self::File(entry.into_path());
            if source.format().is_some() {
                sources.push(source);
            }
        }
        tracing::debug!(directory = %directory.display(), count = sources.len(), "collected rule sources");
        Ok(sources)
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
