//! Ad-hoc scan of the configured files and URLs, one transaction per resource.

use std::path::{Path, PathBuf};

use archgraph_core::config::ScanConfig;
use archgraph_core::constants::RESOURCE_SCOPE_SEPARATOR;
use archgraph_core::errors::{ConfigError, ScanError};
use archgraph_core::traits::GraphStore;
use serde::Serialize;
use url::Url;

use super::engine::{Scanner, ScannerConfig};
use super::registry::PluginRegistry;
use super::types::{ScanItem, ScanStats};

/// What a `ScanTask` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Top-level resources handed to the scanner.
    pub resources: usize,
    /// Configured files that did not exist.
    pub missing: Vec<PathBuf>,
    pub stats: ScanStats,
}

/// A `"<resource>[;<scope>]"` entry split into its parts.
fn split_resource(entry: &str) -> (&str, Option<&str>) {
    match entry.split_once(RESOURCE_SCOPE_SEPARATOR) {
        Some((resource, scope)) => (resource.trim(), Some(scope.trim())),
        None => (entry.trim(), None),
    }
}

pub struct ScanTask<'a> {
    registry: &'a PluginRegistry,
    config: &'a ScanConfig,
}

impl<'a> ScanTask<'a> {
    pub fn new(registry: &'a PluginRegistry, config: &'a ScanConfig) -> Self {
        Self { registry, config }
    }

    /// Scan every configured file, then every configured URL.
    ///
    /// Non-existing files are skipped. Each resource is scanned in its own
    /// transaction; a resource no plugin accepts is an error.
    pub fn run(&self, store: &mut dyn GraphStore) -> Result<ScanSummary, ScanError> {
        let urls = self.parse_urls()?;
        let scanner_config = ScannerConfig::from_scan_config(self.config)?;

        if self.config.effective_reset() {
            tracing::info!("resetting store before scan");
            store.reset()?;
        }

        let mut summary = ScanSummary::default();
        let mut scanner = Scanner::new(self.registry, store, scanner_config);

        for entry in &self.config.include_files {
            let (file, scope_name) = split_resource(entry);
            let path = absolute(Path::new(file));
            if !path.exists() {
                tracing::info!(path = %path.display(), "file does not exist, skipping scan");
                summary.missing.push(path);
                continue;
            }
            let item = if path.is_dir() {
                ScanItem::Directory(path.clone())
            } else {
                ScanItem::file(path.clone())
            };
            let display = path.display().to_string();
            self.scan_resource(&mut scanner, &item, &display, scope_name)?;
            summary.resources += 1;
        }

        for (url, scope_name) in &urls {
            let item = ScanItem::Url(url.clone());
            self.scan_resource(&mut scanner, &item, url.as_str(), scope_name.as_deref())?;
            summary.resources += 1;
        }

        summary.stats = scanner.stats();
        tracing::info!(
            resources = summary.resources,
            scanned = summary.stats.scanned,
            failed = summary.stats.failed,
            "scan finished"
        );
        Ok(summary)
    }

    fn scan_resource(
        &self,
        scanner: &mut Scanner<'_>,
        item: &ScanItem,
        path: &str,
        scope_name: Option<&str>,
    ) -> Result<(), ScanError> {
        let scope = self.registry.scopes().resolve(scope_name);
        if scanner.accepting_plugin(item, path, &scope).is_none() {
            return Err(ScanError::NotAccepted {
                path: path.to_string(),
                scope: scope.to_string(),
            });
        }
        scanner.scan(item, path, &scope)?;
        Ok(())
    }

    /// URLs are validated before anything is written.
    fn parse_urls(&self) -> Result<Vec<(Url, Option<String>)>, ScanError> {
        self.config
            .include_urls
            .iter()
            .map(|entry| {
                let (url, scope) = split_resource(entry);
                let parsed = Url::parse(url).map_err(|e| {
                    ScanError::Config(ConfigError::InvalidValue {
                        field: "scan.include_urls".to_string(),
                        message: format!("cannot parse URL '{url}': {e}"),
                    })
                })?;
                Ok((parsed, scope.map(str::to_string)))
            })
            .collect()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_resource_and_scope() {
        assert_eq!(split_resource("target/classes;java:classpath"), ("target/classes", Some("java:classpath")));
        assert_eq!(split_resource("lib.jar"), ("lib.jar", None));
    }
}
