//! Mapper facade
//!
//! Entry point for transformations. A [`Mapper`] is cheap to clone and can
//! be used from several threads at once; each call gets its own
//! [`ResolutionContext`] over the items supplied for that call.

use objmap_ir::Value;
use std::sync::Arc;

use crate::catalog::Destination;
use crate::config::MapperConfiguration;
use crate::context::{Items, ResolutionContext};

/// Per-call options seeded before any strategy runs
#[derive(Debug, Clone, Default)]
pub struct MappingOptions {
    /// Items visible to every contextual function of the call
    pub items: Items,
}

impl MappingOptions {
    /// Set an item
    pub fn item(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.items.insert(key.into(), value.into());
        self
    }
}

/// Runs type maps of a validated configuration
#[derive(Debug, Clone)]
pub struct Mapper {
    configuration: Arc<MapperConfiguration>,
}

impl Mapper {
    /// Create a mapper over a configuration
    #[must_use]
    pub fn new(configuration: MapperConfiguration) -> Self {
        Self {
            configuration: Arc::new(configuration),
        }
    }

    /// Configuration this mapper runs
    #[must_use]
    pub fn configuration(&self) -> &MapperConfiguration {
        &self.configuration
    }

    /// Map `source` to a new `D`
    ///
    /// # Errors
    ///
    /// Returns an error when no map from `S` to `D` is configured, or when a
    /// strategy or the constructor fails.
    pub fn map<S: 'static, D: Destination>(&self, source: &S) -> crate::Result<D> {
        let mut items = Items::new();
        self.map_with_items(source, &mut items)
    }

    /// Map `source`, seeding the call's items first
    ///
    /// # Errors
    ///
    /// Same as [`Mapper::map`].
    pub fn map_with<S: 'static, D: Destination>(
        &self,
        source: &S,
        configure: impl FnOnce(&mut MappingOptions),
    ) -> crate::Result<D> {
        let mut options = MappingOptions::default();
        configure(&mut options);
        self.map_with_items(source, &mut options.items)
    }

    /// Map `source` over caller-owned items
    ///
    /// Changes made by contextual functions remain visible in `items`
    /// after the call returns.
    ///
    /// # Errors
    ///
    /// Same as [`Mapper::map`].
    pub fn map_with_items<S: 'static, D: Destination>(
        &self,
        source: &S,
        items: &mut Items,
    ) -> crate::Result<D> {
        let mut context = ResolutionContext::new(&self.configuration, items);
        self.configuration.execute(source, &mut context)
    }
}

impl From<MapperConfiguration> for Mapper {
    fn from(configuration: MapperConfiguration) -> Self {
        Self::new(configuration)
    }
}
