//! Type maps
//!
//! A [`TypeMap`] is the configured rule turning an `S` into a `D`. It owns
//! the constructor parameter bindings and the member bindings, and after
//! validation it keeps the constructor descriptor the executor will follow.

use objmap_ir::{Members, Value, find_member};
use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::ConfigurationError;
use crate::bindings::{BindingRegistry, BindingTarget};
use crate::catalog::{ConstructorCatalog, ConstructorDescriptor, Destination, DestinationType};
use crate::settings::ConventionSettings;
use crate::strategy::{ResolutionOptions, ResolutionStrategy};
use crate::validator::{validate_constructor_bindings, validate_member_bindings};

/// Reads the source member matching a parameter name
type ConventionFn<S> = Arc<dyn Fn(&S, &str, bool) -> Option<Value> + Send + Sync>;

/// Configured transformation from `S` to `D`
pub struct TypeMap<S, D> {
    ctor_params: BindingRegistry<S>,
    members: BindingRegistry<S>,
    conventions: Option<ConventionFn<S>>,
    constructor: Option<Arc<ConstructorDescriptor>>,
    validated: bool,
    _destination: PhantomData<fn() -> D>,
}

impl<S: 'static, D: Destination> TypeMap<S, D> {
    pub(crate) fn new() -> Self {
        Self {
            ctor_params: BindingRegistry::new(D::full_name(), BindingTarget::ConstructorParameter),
            members: BindingRegistry::new(D::full_name(), BindingTarget::Member),
            conventions: None,
            constructor: None,
            validated: false,
            _destination: PhantomData,
        }
    }

    /// Bind a constructor parameter of `D` by name
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateBinding`] when the parameter is already bound.
    pub fn for_ctor_param(
        &mut self,
        name: impl Into<String>,
        configure: impl FnOnce(ResolutionOptions<S>) -> ResolutionStrategy<S>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.ctor_params.bind(name, configure(ResolutionOptions::new()))?;
        Ok(self)
    }

    /// Bind a settable member of `D`, assigned after construction
    ///
    /// The name is checked when the configuration is built if `D` declares
    /// [`Destination::member_names`]; otherwise an unknown name surfaces as
    /// `MappingError::UnknownMember` on the first mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateBinding`] when the member is already bound.
    pub fn for_member(
        &mut self,
        name: impl Into<String>,
        configure: impl FnOnce(ResolutionOptions<S>) -> ResolutionStrategy<S>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.members.bind(name, configure(ResolutionOptions::new()))?;
        Ok(self)
    }

    /// Erased handle on `D`
    #[must_use]
    pub fn destination_type(&self) -> DestinationType {
        DestinationType::of::<D>()
    }

    /// Constructor parameter bindings
    #[must_use]
    pub fn ctor_param_bindings(&self) -> &BindingRegistry<S> {
        &self.ctor_params
    }

    /// Member bindings
    #[must_use]
    pub fn member_bindings(&self) -> &BindingRegistry<S> {
        &self.members
    }

    /// Constructor approved by validation
    #[must_use]
    pub fn constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructor.as_deref()
    }

    /// Whether the map passed validation
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Whether unbound parameters may be read from source members
    #[must_use]
    pub fn uses_member_conventions(&self) -> bool {
        self.conventions.is_some()
    }

    /// Check the bindings against the catalog without changing the map
    pub(crate) fn validate(
        &self,
        catalog: &dyn ConstructorCatalog,
    ) -> Result<Option<Arc<ConstructorDescriptor>>, ConfigurationError> {
        let destination = self.destination_type();
        let constructor = validate_constructor_bindings(&destination, &self.ctor_params, catalog)?;
        validate_member_bindings(&destination, &self.members, D::member_names())?;
        Ok(constructor)
    }

    pub(crate) fn resolve_by_convention(
        &self,
        source: &S,
        parameter: &str,
        settings: ConventionSettings,
    ) -> Option<Value> {
        if !settings.enabled {
            return None;
        }
        self.conventions
            .as_ref()
            .and_then(|lookup| lookup(source, parameter, settings.ignore_case))
    }
}

impl<S: Members + 'static, D: Destination> TypeMap<S, D> {
    /// Fill constructor parameters without an explicit binding from the
    /// source member of the same name
    pub fn with_member_conventions(&mut self) -> &mut Self {
        self.conventions = Some(Arc::new(
            |source: &S, parameter: &str, ignore_case: bool| -> Option<Value> {
                find_member(S::member_names(), parameter, ignore_case)
                    .and_then(|member| source.member(member))
            },
        ));
        self
    }
}

impl<S, D> fmt::Debug for TypeMap<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMap")
            .field("source", &type_name::<S>())
            .field("destination", &type_name::<D>())
            .field("ctor_params", &self.ctor_params)
            .field("members", &self.members)
            .field("conventions", &self.conventions.is_some())
            .field("validated", &self.validated)
            .finish()
    }
}

/// Object-safe view of a `TypeMap<S, D>`, stored by the configuration
pub(crate) trait ErasedTypeMap: Any + Send + Sync {
    fn source_name(&self) -> &'static str;

    fn destination_name(&self) -> &'static str;

    /// Re-run validation against the catalog
    fn check(&self, catalog: &dyn ConstructorCatalog) -> Result<(), ConfigurationError>;

    /// Validate and keep the approved constructor
    fn seal(&mut self, catalog: &dyn ConstructorCatalog) -> Result<(), ConfigurationError>;

    fn as_any(&self) -> &dyn Any;
}

impl<S: 'static, D: Destination> ErasedTypeMap for TypeMap<S, D> {
    fn source_name(&self) -> &'static str {
        type_name::<S>()
    }

    fn destination_name(&self) -> &'static str {
        D::full_name()
    }

    fn check(&self, catalog: &dyn ConstructorCatalog) -> Result<(), ConfigurationError> {
        self.validate(catalog).map(|_| ())
    }

    fn seal(&mut self, catalog: &dyn ConstructorCatalog) -> Result<(), ConfigurationError> {
        self.constructor = self.validate(catalog)?;
        self.validated = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigurationErrorKind;
    use crate::catalog::{Arguments, DeclaredCatalog};

    struct Source {
        value: i32,
    }

    impl Members for Source {
        fn member_names() -> &'static [&'static str] {
            &["Value"]
        }

        fn member(&self, name: &str) -> Option<Value> {
            (name == "Value").then(|| self.value.into())
        }
    }

    struct Dest;

    impl Destination for Dest {
        fn constructor() -> Option<ConstructorDescriptor> {
            Some(ConstructorDescriptor::new().parameter::<i32>("value"))
        }

        fn construct(_args: Arguments) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_duplicate_ctor_param_fails_immediately() {
        let mut map = TypeMap::<Source, Dest>::new();
        map.for_ctor_param("nope", |opt| opt.map_from(|s: &Source| s.value))
            .unwrap();
        let err = map
            .for_ctor_param("nope", |opt| opt.use_value(1))
            .unwrap_err();
        assert_eq!(err.kind(), ConfigurationErrorKind::DuplicateBinding);
        assert!(!map.is_validated());
    }

    #[test]
    fn test_seal_records_constructor() {
        let mut map = TypeMap::<Source, Dest>::new();
        map.for_ctor_param("value", |opt| opt.map_from(|s: &Source| s.value))
            .unwrap();
        map.seal(&DeclaredCatalog::new()).unwrap();
        assert!(map.is_validated());
        assert_eq!(map.constructor().unwrap().parameter_count(), 1);
    }

    #[test]
    fn test_conventions_respect_settings() {
        let mut map = TypeMap::<Source, Dest>::new();
        map.with_member_conventions();
        let source = Source { value: 4 };

        let enabled = ConventionSettings::default();
        assert_eq!(
            map.resolve_by_convention(&source, "value", enabled),
            Some(Value::Integer(4))
        );

        let exact = ConventionSettings {
            ignore_case: false,
            ..enabled
        };
        assert_eq!(map.resolve_by_convention(&source, "value", exact), None);

        let disabled = ConventionSettings {
            enabled: false,
            ..enabled
        };
        assert_eq!(map.resolve_by_convention(&source, "Value", disabled), None);
    }
}
