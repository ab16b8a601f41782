//! Per-call resolution context
//!
//! One context exists per top-level `map` call. It borrows the caller's
//! `Items` store, so every contextual function reached from that call,
//! including those of nested maps, reads and writes the same map.

use objmap_ir::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use crate::MappingError;
use crate::catalog::Destination;
use crate::config::MapperConfiguration;
use crate::settings::MapperSettings;

/// Caller-supplied key/value state for one top-level mapping call
pub type Items = HashMap<String, Value>;

/// Execution context handed to contextual functions
pub struct ResolutionContext<'a> {
    configuration: &'a MapperConfiguration,
    items: &'a mut Items,
    depth: usize,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(configuration: &'a MapperConfiguration, items: &'a mut Items) -> Self {
        Self {
            configuration,
            items,
            depth: 0,
        }
    }

    /// Items seeded by the caller
    #[must_use]
    pub fn items(&self) -> &Items {
        &*self.items
    }

    /// Mutable access to the items
    pub fn items_mut(&mut self) -> &mut Items {
        &mut *self.items
    }

    /// Get an item
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    /// Get an item that must be present
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MissingItem`] when the caller did not supply `key`.
    pub fn require_item(&self, key: &str) -> crate::Result<&Value> {
        self.items.get(key).ok_or_else(|| MappingError::MissingItem {
            key: key.to_string(),
        })
    }

    /// Set an item, returning the previous value
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.items.insert(key.into(), value.into())
    }

    /// Nesting level, 0 for the top-level map
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Settings of the configuration being executed
    #[must_use]
    pub fn settings(&self) -> &MapperSettings {
        self.configuration.settings()
    }

    /// Map a nested source with the same items
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MaxDepthExceeded`] past the configured depth,
    /// otherwise any error of the nested map.
    pub fn map<S: 'static, D: Destination>(&mut self, source: &S) -> crate::Result<D> {
        let configuration = self.configuration;
        let max_depth = configuration.settings().max_depth;
        if self.depth >= max_depth {
            return Err(MappingError::MaxDepthExceeded { max_depth });
        }

        self.depth += 1;
        trace!(depth = self.depth, destination = D::full_name(), "nested map");
        let result = configuration.execute::<S, D>(source, self);
        self.depth -= 1;
        result
    }
}

impl fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("items", &self.items)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
