//! Mapper configuration
//!
//! Type maps are registered on a [`MapperConfigurationBuilder`]. Building the
//! configuration validates every map against the constructor catalog; the
//! resulting [`MapperConfiguration`] is immutable and can be shared between
//! threads.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{ConstructorCatalog, DeclaredCatalog, Destination};
use crate::context::ResolutionContext;
use crate::executor;
use crate::mapper::Mapper;
use crate::settings::MapperSettings;
use crate::type_map::{ErasedTypeMap, TypeMap};
use crate::{ConfigurationError, ConfigurationErrors, MappingError};

type TypePair = (TypeId, TypeId);

/// Collects type maps before validation
pub struct MapperConfigurationBuilder {
    settings: MapperSettings,
    catalog: Arc<dyn ConstructorCatalog>,
    maps: Vec<Box<dyn ErasedTypeMap>>,
    index: HashMap<TypePair, usize>,
}

impl MapperConfigurationBuilder {
    /// Create a builder with default settings and the declared catalog
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: MapperSettings::default(),
            catalog: Arc::new(DeclaredCatalog::new()),
            maps: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Replace the settings
    pub fn with_settings(&mut self, settings: MapperSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Replace the constructor catalog
    pub fn with_catalog(&mut self, catalog: impl ConstructorCatalog + 'static) -> &mut Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Register and configure the map from `S` to `D`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateTypeMap`] when the pair is
    /// already registered, or the first error returned by `configure`.
    pub fn create_map<S: 'static, D: Destination>(
        &mut self,
        configure: impl FnOnce(&mut TypeMap<S, D>) -> Result<(), ConfigurationError>,
    ) -> Result<&mut Self, ConfigurationError> {
        let key = (TypeId::of::<S>(), TypeId::of::<D>());
        if self.index.contains_key(&key) {
            return Err(ConfigurationError::DuplicateTypeMap {
                source_type: type_name::<S>().to_string(),
                destination: D::full_name().to_string(),
            });
        }

        let mut map = TypeMap::<S, D>::new();
        configure(&mut map)?;

        debug!(
            source_type = type_name::<S>(),
            destination = D::full_name(),
            ctor_params = map.ctor_param_bindings().len(),
            members = map.member_bindings().len(),
            "registered type map"
        );
        self.index.insert(key, self.maps.len());
        self.maps.push(Box::new(map));
        Ok(self)
    }

    /// Number of registered type maps
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Check if no type map is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Validate every type map and seal the configuration
    ///
    /// Each map reports at most one error; errors of all maps are returned together.
    ///
    /// # Errors
    ///
    /// Returns the collected [`ConfigurationErrors`] when any map is invalid.
    pub fn build(mut self) -> Result<MapperConfiguration, ConfigurationErrors> {
        let mut errors = Vec::new();
        for map in &mut self.maps {
            if let Err(error) = map.seal(self.catalog.as_ref()) {
                errors.push(error);
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "mapper configuration is invalid");
            return Err(ConfigurationErrors::new(errors));
        }

        debug!(type_maps = self.maps.len(), "mapper configuration sealed");
        Ok(MapperConfiguration {
            settings: self.settings,
            catalog: self.catalog,
            maps: self.maps,
            index: self.index,
        })
    }
}

impl Default for MapperConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapperConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfigurationBuilder")
            .field("settings", &self.settings)
            .field("maps", &describe(&self.maps))
            .finish_non_exhaustive()
    }
}

/// Validated, immutable set of type maps
pub struct MapperConfiguration {
    settings: MapperSettings,
    catalog: Arc<dyn ConstructorCatalog>,
    maps: Vec<Box<dyn ErasedTypeMap>>,
    index: HashMap<TypePair, usize>,
}

impl MapperConfiguration {
    /// Start a configuration
    #[must_use]
    pub fn builder() -> MapperConfigurationBuilder {
        MapperConfigurationBuilder::new()
    }

    /// Configure and build in one step
    ///
    /// # Errors
    ///
    /// Returns the registration error raised by `configure`, or every
    /// validation error found while building.
    pub fn new(
        configure: impl FnOnce(&mut MapperConfigurationBuilder) -> Result<(), ConfigurationError>,
    ) -> Result<Self, ConfigurationErrors> {
        let mut builder = MapperConfigurationBuilder::new();
        configure(&mut builder)?;
        builder.build()
    }

    /// Settings in effect
    #[must_use]
    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    /// Look up the map from `S` to `D`
    #[must_use]
    pub fn type_map<S: 'static, D: Destination>(&self) -> Option<&TypeMap<S, D>> {
        let position = self.index.get(&(TypeId::of::<S>(), TypeId::of::<D>()))?;
        self.maps[*position].as_any().downcast_ref()
    }

    /// Number of type maps
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Check if the configuration has no type maps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Validate every type map again
    ///
    /// A configuration that built successfully passes again; the catalog
    /// answers are stable for a given type.
    ///
    /// # Errors
    ///
    /// Returns the collected [`ConfigurationErrors`] when any map is invalid.
    pub fn assert_configuration_is_valid(&self) -> Result<(), ConfigurationErrors> {
        let errors: Vec<_> = self
            .maps
            .iter()
            .filter_map(|map| map.check(self.catalog.as_ref()).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationErrors::new(errors))
        }
    }

    /// Create a mapper over this configuration
    #[must_use]
    pub fn create_mapper(self) -> Mapper {
        Mapper::new(self)
    }

    pub(crate) fn execute<S: 'static, D: Destination>(
        &self,
        source: &S,
        context: &mut ResolutionContext<'_>,
    ) -> crate::Result<D> {
        let map = self
            .type_map::<S, D>()
            .ok_or_else(|| MappingError::MissingTypeMap {
                source_type: type_name::<S>().to_string(),
                destination: D::full_name().to_string(),
            })?;
        executor::construct(map, source, context)
    }
}

impl fmt::Debug for MapperConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfiguration")
            .field("settings", &self.settings)
            .field("maps", &describe(&self.maps))
            .finish_non_exhaustive()
    }
}

fn describe(maps: &[Box<dyn ErasedTypeMap>]) -> Vec<String> {
    maps.iter()
        .map(|map| format!("{} -> {}", map.source_name(), map.destination_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigurationErrorKind;
    use crate::catalog::{Arguments, ConstructorDescriptor};

    struct Source {
        value: i32,
    }

    #[derive(Debug)]
    struct Dest {
        value1: i32,
    }

    impl Destination for Dest {
        fn constructor() -> Option<ConstructorDescriptor> {
            Some(ConstructorDescriptor::new().parameter::<i32>("thing"))
        }

        fn construct(mut args: Arguments) -> crate::Result<Self> {
            Ok(Self {
                value1: args.take("thing")?,
            })
        }
    }

    struct Other;

    impl Destination for Other {
        fn constructor() -> Option<ConstructorDescriptor> {
            None
        }

        fn construct(_args: Arguments) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_type_map_lookup() {
        let config = MapperConfiguration::new(|cfg| {
            cfg.create_map::<Source, Dest>(|map| {
                map.for_ctor_param("thing", |opt| opt.map_from(|s: &Source| s.value))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let map = config.type_map::<Source, Dest>().unwrap();
        assert!(map.is_validated());
        assert!(config.type_map::<Source, Other>().is_none());
        assert_eq!(config.len(), 1);

        let dest: Dest = config.create_mapper().map(&Source { value: 2 }).unwrap();
        assert_eq!(dest.value1, 2);
    }

    #[test]
    fn test_duplicate_type_map() {
        let err = MapperConfiguration::new(|cfg| {
            cfg.create_map::<Source, Dest>(|_| Ok(()))?;
            cfg.create_map::<Source, Dest>(|_| Ok(()))?;
            Ok(())
        })
        .unwrap_err();
        assert!(err.contains(ConfigurationErrorKind::DuplicateTypeMap));
    }

    #[test]
    fn test_errors_aggregated_across_maps() {
        let err = MapperConfiguration::new(|cfg| {
            cfg.create_map::<Source, Dest>(|map| {
                map.for_ctor_param("think", |opt| opt.map_from(|s: &Source| s.value))?;
                Ok(())
            })?;
            cfg.create_map::<Source, Other>(|map| {
                map.for_ctor_param("thing", |opt| opt.map_from(|s: &Source| s.value))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.len(), 2);
        assert_eq!(err.errors()[0].kind(), ConfigurationErrorKind::UnknownCtorParam);
        assert_eq!(err.errors()[1].kind(), ConfigurationErrorKind::NoConstructor);
        let message = err.to_string();
        assert!(message.contains(Dest::full_name()));
        assert!(message.contains(Other::full_name()));
    }

    #[test]
    fn test_assert_configuration_is_valid_is_stable() {
        let config = MapperConfiguration::new(|cfg| {
            cfg.create_map::<Source, Dest>(|map| {
                map.for_ctor_param("thing", |opt| opt.map_from(|s: &Source| s.value))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        assert!(config.assert_configuration_is_valid().is_ok());
        assert!(config.assert_configuration_is_valid().is_ok());
    }

    #[test]
    fn test_execute_without_map() {
        let config = MapperConfiguration::builder().build().unwrap();
        let mapper = config.create_mapper();
        let err = mapper.map::<Source, Dest>(&Source { value: 1 }).unwrap_err();
        assert!(matches!(err, MappingError::MissingTypeMap { .. }));
    }

    #[test]
    fn test_mapper_configuration_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MapperConfiguration>();
    }
}
