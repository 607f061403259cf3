//! The scanner engine: first-match plugin dispatch inside a transaction.

use archgraph_core::config::ScanConfig;
use archgraph_core::errors::{ConfigError, ScanError, StorageError};
use archgraph_core::traits::GraphStore;
use archgraph_core::types::NodeId;

use super::context::ScannerContext;
use super::plugin::ScannerPlugin;
use super::registry::PluginRegistry;
use super::scope::Scope;
use super::types::{ScanItem, ScanStats};

/// Runtime settings for a `Scanner`.
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    pub continue_on_error: bool,
    /// Relative paths matching any of these are not scanned.
    pub exclude: Vec<glob::Pattern>,
}

impl ScannerConfig {
    pub fn from_scan_config(config: &ScanConfig) -> Result<Self, ScanError> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    ScanError::Config(ConfigError::InvalidValue {
                        field: "scan.exclude".to_string(),
                        message: format!("invalid glob '{p}': {e}"),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            continue_on_error: config.effective_continue_on_error(),
            exclude,
        })
    }
}

/// Where a single scan's writes are committed or undone.
enum Boundary {
    Transaction,
    Savepoint(String),
}

pub struct Scanner<'a> {
    registry: &'a PluginRegistry,
    context: ScannerContext<'a>,
    config: ScannerConfig,
    stats: ScanStats,
    /// Nesting level of scans in progress; names savepoints uniquely.
    depth: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(
        registry: &'a PluginRegistry,
        store: &'a mut dyn GraphStore,
        config: ScannerConfig,
    ) -> Self {
        Self {
            registry,
            context: ScannerContext::new(store),
            config,
            stats: ScanStats::default(),
            depth: 0,
        }
    }

    pub fn context(&mut self) -> &mut ScannerContext<'a> {
        &mut self.context
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// The plugin that would scan `item`, if any.
    pub fn accepting_plugin(
        &self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
    ) -> Option<&'a dyn ScannerPlugin> {
        let registry: &'a PluginRegistry = self.registry;
        registry
            .plugins_for(item.kind())
            .find(|plugin| plugin.accepts(item, path, scope))
    }

    /// Scan one item with the first accepting plugin.
    ///
    /// Opens a transaction when none is active and commits it afterwards;
    /// inside an active transaction the scan runs under a savepoint instead.
    /// A failing plugin or commit undoes that scan's writes; the failure is
    /// then logged and skipped under continue-on-error, otherwise returned as
    /// `ScanError::Unrecoverable`. Items no plugin accepts yield `Ok(None)`.
    pub fn scan(
        &mut self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
    ) -> Result<Option<NodeId>, ScanError> {
        let Some(plugin) = self.accepting_plugin(item, path, scope) else {
            tracing::trace!(path, "no plugin accepts item, skipping");
            self.stats.skipped += 1;
            return Ok(None);
        };
        self.safe_scan(plugin, item, path, scope)
    }

    fn safe_scan(
        &mut self,
        plugin: &dyn ScannerPlugin,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
    ) -> Result<Option<NodeId>, ScanError> {
        let boundary = match self.open_boundary() {
            Ok(boundary) => boundary,
            Err(error) => return self.handle_failure(item, path, scope, error.into()),
        };

        tracing::debug!(plugin = plugin.name(), path, %scope, "scanning");
        self.depth += 1;
        let scanned = plugin.scan(item, path, scope, self);
        self.depth -= 1;
        let outcome = scanned.and_then(|node| {
            self.close_boundary(&boundary)?;
            Ok(node)
        });

        match outcome {
            Ok(node) => {
                self.stats.scanned += 1;
                Ok(node)
            }
            Err(error) => {
                self.undo_boundary(&boundary, path);
                self.handle_failure(item, path, scope, error)
            }
        }
    }

    /// Own transaction at the top level, a savepoint inside a caller's one.
    fn open_boundary(&mut self) -> Result<Boundary, StorageError> {
        let name = format!("scan_{}", self.depth);
        let store = self.context.store();
        if store.has_active_transaction() {
            store.savepoint(&name)?;
            Ok(Boundary::Savepoint(name))
        } else {
            store.begin_transaction()?;
            Ok(Boundary::Transaction)
        }
    }

    fn close_boundary(&mut self, boundary: &Boundary) -> Result<(), StorageError> {
        match boundary {
            Boundary::Transaction => self.context.store().commit_transaction(),
            Boundary::Savepoint(name) => self.context.store().release_savepoint(name),
        }
    }

    fn undo_boundary(&mut self, boundary: &Boundary, path: &str) {
        let store = self.context.store();
        let undone = match boundary {
            Boundary::Transaction if store.has_active_transaction() => store.rollback_transaction(),
            Boundary::Transaction => Ok(()),
            Boundary::Savepoint(name) => store.rollback_to_savepoint(name),
        };
        if let Err(rollback_err) = undone {
            tracing::warn!(path, error = %rollback_err, "rollback after failed scan failed");
        }
    }

    fn handle_failure(
        &mut self,
        item: &ScanItem,
        path: &str,
        scope: &Scope,
        error: ScanError,
    ) -> Result<Option<NodeId>, ScanError> {
        if self.config.continue_on_error {
            tracing::error!(
                item = %item,
                path,
                scope = %scope,
                error = %error,
                "unable to scan, continuing"
            );
            self.stats.failed += 1;
            return Ok(None);
        }
        match error {
            // Already carries the innermost item; don't wrap per nesting level.
            ScanError::Unrecoverable { .. } => Err(error),
            other => Err(ScanError::Unrecoverable {
                item: item.to_string(),
                path: path.to_string(),
                scope: scope.to_string(),
                continue_on_error: false,
                source: Box::new(other),
            }),
        }
    }
}
