//! Scanner data types: ScanItem, FileResource, ItemKind, ScanStats.

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use archgraph_core::errors::ScanError;
use archgraph_core::types::NodeId;
use serde::{Deserialize, Serialize};
use url::Url;

/// Type tag carried by every scannable item and plugin registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    File,
    Directory,
    Url,
}

/// Readable file content: either on disk or already in memory
/// (archive entries, generated resources).
#[derive(Debug, Clone)]
pub enum FileResource {
    Path(PathBuf),
    Bytes { name: String, data: Arc<[u8]> },
}

impl FileResource {
    pub fn bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Display name: the path on disk or the in-memory name.
    pub fn name(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn open(&self) -> Result<Box<dyn Read + '_>, ScanError> {
        match self {
            Self::Path(p) => {
                let file = std::fs::File::open(p).map_err(|e| io_error(p, e))?;
                Ok(Box::new(std::io::BufReader::new(file)))
            }
            Self::Bytes { data, .. } => Ok(Box::new(Cursor::new(&data[..]))),
        }
    }

    pub fn read_to_vec(&self) -> Result<Vec<u8>, ScanError> {
        match self {
            Self::Path(p) => std::fs::read(p).map_err(|e| io_error(p, e)),
            Self::Bytes { data, .. } => Ok(data.to_vec()),
        }
    }

    pub fn read_to_string(&self) -> Result<String, ScanError> {
        let bytes = self.read_to_vec()?;
        String::from_utf8(bytes).map_err(|e| ScanError::ParseError {
            path: self.name(),
            message: format!("not valid UTF-8: {e}"),
        })
    }
}

/// Anything the scanner can dispatch to a plugin.
#[derive(Debug, Clone)]
pub enum ScanItem {
    File(FileResource),
    Directory(PathBuf),
    Url(Url),
}

impl ScanItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::File(_) => ItemKind::File,
            Self::Directory(_) => ItemKind::Directory,
            Self::Url(_) => ItemKind::Url,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileResource::Path(path.into()))
    }
}

impl fmt::Display for ScanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => f.write_str(&file.name()),
            Self::Directory(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u.as_str()),
        }
    }
}

/// Relation from a container (directory, archive) to each node scanned inside it.
pub const CONTAINS: &str = "CONTAINS";

/// Scanner-context value: the node that nested scans attach their nodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container(pub NodeId);

/// Outcome counters for one `Scanner`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Items a plugin accepted and scanned successfully.
    pub scanned: usize,
    /// Items no plugin accepted.
    pub skipped: usize,
    /// Items whose scan failed and were skipped under continue-on-error.
    pub failed: usize,
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ScanError {
    ScanError::IoError {
        path: path.to_path_buf(),
        source,
    }
}
