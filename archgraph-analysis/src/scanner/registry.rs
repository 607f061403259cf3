//! Ordered plugin registrations, each tagged with its item kind.

use std::collections::BTreeMap;

use archgraph_core::errors::ScanError;

use super::plugin::ScannerPlugin;
use super::scope::{Scope, ScopeRegistry};
use super::types::ItemKind;

struct Registration {
    kind: ItemKind,
    plugin: Box<dyn ScannerPlugin>,
}

/// Plugins in registration order plus the scopes they understand.
#[derive(Default)]
pub struct PluginRegistry {
    registrations: Vec<Registration>,
    scopes: ScopeRegistry,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure and append a plugin. Earlier registrations win ties.
    pub fn register(
        &mut self,
        mut plugin: Box<dyn ScannerPlugin>,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), ScanError> {
        plugin.configure(properties)?;
        tracing::debug!(plugin = plugin.name(), kind = ?plugin.item_kind(), "registered scanner plugin");
        self.registrations.push(Registration {
            kind: plugin.item_kind(),
            plugin,
        });
        Ok(())
    }

    pub fn register_scope(&mut self, scope: Scope) {
        self.scopes.register(scope);
    }

    pub fn scopes(&self) -> &ScopeRegistry {
        &self.scopes
    }

    /// Plugins registered for `kind`, in registration order.
    pub fn plugins_for(&self, kind: ItemKind) -> impl Iterator<Item = &dyn ScannerPlugin> {
        self.registrations
            .iter()
            .filter(move |r| r.kind == kind)
            .map(|r| r.plugin.as_ref())
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
