//! Scopes: `prefix:name` qualifiers telling plugins how to interpret an item.

use std::fmt;

use archgraph_core::types::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Scope {
    prefix: String,
    name: String,
}

impl Scope {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }

    /// The empty scope, used when none is requested.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_none(&self) -> bool {
        self.prefix.is_empty() && self.name.is_empty()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return Ok(());
        }
        write!(f, "{}:{}", self.prefix, self.name)
    }
}

/// Known scopes, looked up by their `prefix:name` string.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    scopes: FxHashMap<String, Scope>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scope: Scope) {
        self.scopes.insert(scope.to_string(), scope);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    /// Resolve a scope name. Unknown names fall back to the empty scope.
    pub fn resolve(&self, name: Option<&str>) -> Scope {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Scope::none();
        };
        match self.scopes.get(name) {
            Some(scope) => scope.clone(),
            None => {
                tracing::warn!(scope = name, "no scope registered with this name, using none");
                Scope::none()
            }
        }
    }
}
