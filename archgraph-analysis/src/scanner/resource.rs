//! Resource enumeration: directories, ZIP archives, URLs and in-memory entries.
//!
//! Every source yields `ResourceEntry` values one at a time. Sources own
//! their handles (open archives, directory walkers) and release them when
//! dropped.

use std::collections::VecDeque;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use archgraph_core::errors::ScanError;
use url::Url;
use walkdir::WalkDir;

use super::types::{io_error, FileResource};

/// One enumerated resource.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// Name handed to plugin matching.
    pub name: String,
    pub is_directory: bool,
    /// Content of a file entry; `None` for directories.
    pub file: Option<FileResource>,
}

impl ResourceEntry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            file: None,
        }
    }

    pub fn file(name: impl Into<String>, file: FileResource) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            file: Some(file),
        }
    }
}

/// A single-pass sequence of resource entries.
pub trait EntrySource {
    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, ScanError>;
}

/// Recursive directory walk. Each directory comes before its children,
/// siblings are sorted by name, and names are relative to the root with `/`
/// separators. The root itself is the first entry, named `""`.
pub struct DirectoryEntries {
    walker: walkdir::IntoIter,
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
}

impl DirectoryEntries {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::with_exclude(root, Vec::new())
    }

    pub fn with_exclude(root: impl AsRef<Path>, exclude: Vec<glob::Pattern>) -> Result<Self, ScanError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(io_error(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
            ));
        }
        tracing::info!(root = %root.display(), "scanning directory");
        let walker = WalkDir::new(&root).sort_by_file_name().into_iter();
        Ok(Self {
            walker,
            root,
            exclude,
        })
    }

    fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        name.trim_end_matches('/').to_string()
    }

    fn is_excluded(&self, name: &str) -> bool {
        !name.is_empty() && self.exclude.iter().any(|p| p.matches(name))
    }
}

impl EntrySource for DirectoryEntries {
    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, ScanError> {
        loop {
            let Some(next) = self.walker.next() else {
                return Ok(None);
            };
            let entry = next.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                io_error(&path, std::io::Error::other(e.to_string()))
            })?;

            let name = self.relative_name(entry.path());
            let is_directory = entry.file_type().is_dir();
            if self.is_excluded(&name) {
                if is_directory {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            return Ok(Some(if is_directory {
                ResourceEntry::directory(name)
            } else {
                ResourceEntry::file(name, FileResource::Path(entry.into_path()))
            }));
        }
    }
}

/// ZIP archive entries in the archive's own order, names exactly as stored.
pub struct ArchiveEntries<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    label: String,
    index: usize,
}

impl<R: Read + Seek> ArchiveEntries<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Result<Self, ScanError> {
        let label = label.into();
        let archive = zip::ZipArchive::new(reader).map_err(|e| ScanError::ArchiveError {
            path: label.clone(),
            message: e.to_string(),
        })?;
        tracing::info!(archive = %label, entries = archive.len(), "scanning archive");
        Ok(Self {
            archive,
            label,
            index: 0,
        })
    }
}

impl ArchiveEntries<std::fs::File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
        Self::new(file, path.display().to_string())
    }
}

impl<R: Read + Seek> EntrySource for ArchiveEntries<R> {
    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, ScanError> {
        if self.index >= self.archive.len() {
            return Ok(None);
        }
        let index = self.index;
        self.index += 1;

        let mut zip_entry = self
            .archive
            .by_index(index)
            .map_err(|e| ScanError::ArchiveError {
                path: self.label.clone(),
                message: e.to_string(),
            })?;
        let name = zip_entry.name().to_string();
        if zip_entry.is_dir() {
            return Ok(Some(ResourceEntry::directory(name)));
        }

        let mut data = Vec::with_capacity(usize::try_from(zip_entry.size()).unwrap_or(0));
        zip_entry
            .read_to_end(&mut data)
            .map_err(|e| ScanError::ArchiveError {
                path: format!("{}!{}", self.label, name),
                message: e.to_string(),
            })?;
        Ok(Some(ResourceEntry::file(
            name.clone(),
            FileResource::bytes(name, data),
        )))
    }
}

/// `file:` URLs, each yielded as a file entry named by its URL path.
pub struct UrlEntries {
    urls: VecDeque<Url>,
}

impl UrlEntries {
    pub fn new(urls: impl IntoIterator<Item = Url>) -> Self {
        Self {
            urls: urls.into_iter().collect(),
        }
    }
}

impl EntrySource for UrlEntries {
    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, ScanError> {
        let Some(url) = self.urls.pop_front() else {
            return Ok(None);
        };
        let path = url_to_path(&url)?;
        Ok(Some(ResourceEntry::file(url.path().to_string(), FileResource::Path(path))))
    }
}

/// Local path behind a `file:` URL.
pub fn url_to_path(url: &Url) -> Result<PathBuf, ScanError> {
    if url.scheme() != "file" {
        return Err(ScanError::UnsupportedUrl {
            url: url.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    url.to_file_path().map_err(|()| ScanError::UnsupportedUrl {
        url: url.to_string(),
        scheme: url.scheme().to_string(),
    })
}

/// Pre-built entries, e.g. generated classes named `/pkg/Name.class`.
pub struct MemoryEntries {
    entries: VecDeque<ResourceEntry>,
}

impl MemoryEntries {
    pub fn new(entries: impl IntoIterator<Item = ResourceEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Class files keyed by fully-qualified class name (`com.acme.Foo`),
    /// named `/com/acme/Foo.class`.
    pub fn classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        Self::new(classes.into_iter().map(|(class_name, bytes)| {
            let name = format!("/{}.class", class_name.as_ref().replace('.', "/"));
            ResourceEntry::file(name.clone(), FileResource::bytes(name, bytes))
        }))
    }
}

impl EntrySource for MemoryEntries {
    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, ScanError> {
        Ok(self.entries.pop_front())
    }
}
