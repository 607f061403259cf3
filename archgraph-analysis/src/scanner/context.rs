//! Scanner context: the store plus typed value stacks shared by nested plugins.

use std::any::{type_name, Any, TypeId};

use archgraph_core::errors::ScanError;
use archgraph_core::traits::GraphStore;
use archgraph_core::types::FxHashMap;

/// State visible to every plugin during one scan.
///
/// Plugins push values (e.g. the container node currently being filled)
/// before delegating to nested scans and pop them afterwards. Each type has
/// its own stack.
pub struct ScannerContext<'a> {
    store: &'a mut dyn GraphStore,
    values: FxHashMap<TypeId, Vec<Box<dyn Any>>>,
}

impl<'a> ScannerContext<'a> {
    pub fn new(store: &'a mut dyn GraphStore) -> Self {
        Self {
            store,
            values: FxHashMap::default(),
        }
    }

    pub fn store(&mut self) -> &mut dyn GraphStore {
        &mut *self.store
    }

    pub fn push<T: Any>(&mut self, value: T) {
        self.values
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Box::new(value));
    }

    /// Top of the `T` stack. An empty stack is an error.
    pub fn peek<T: Any>(&self) -> Result<&T, ScanError> {
        self.try_peek::<T>().ok_or(ScanError::MissingContextValue {
            type_name: type_name::<T>(),
        })
    }

    pub fn try_peek<T: Any>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|stack| stack.last())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Top of the `T` stack, or `default` when it is empty.
    pub fn peek_or<T: Any + Clone>(&self, default: T) -> T {
        self.try_peek::<T>().cloned().unwrap_or(default)
    }

    pub fn pop<T: Any>(&mut self) -> Result<T, ScanError> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|stack| stack.pop())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
            .ok_or(ScanError::MissingContextValue {
                type_name: type_name::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_storage::SqliteGraphStore;

    #[derive(Debug, Clone, PartialEq)]
    struct Marker(&'static str);

    #[test]
    fn stacks_are_per_type_and_lifo() {
        let mut store = SqliteGraphStore::in_memory();
        let mut context = ScannerContext::new(&mut store);

        context.push(Marker("outer"));
        context.push(Marker("inner"));
        context.push(7_u32);

        assert_eq!(context.peek::<Marker>().unwrap(), &Marker("inner"));
        assert_eq!(context.pop::<Marker>().unwrap(), Marker("inner"));
        assert_eq!(context.peek::<Marker>().unwrap(), &Marker("outer"));
        assert_eq!(context.pop::<u32>().unwrap(), 7);
        assert!(context.try_peek::<u32>().is_none());
    }

    #[test]
    fn empty_stack_is_an_error_unless_defaulted() {
        let mut store = SqliteGraphStore::in_memory();
        let mut context = ScannerContext::new(&mut store);

        assert!(matches!(
            context.peek::<Marker>(),
            Err(ScanError::MissingContextValue { .. })
        ));
        assert!(context.pop::<Marker>().is_err());
        assert_eq!(context.peek_or(Marker("fallback")), Marker("fallback"));
    }
}
