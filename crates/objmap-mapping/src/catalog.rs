//! Constructor catalog
//!
//! Describes the constructor a destination type exposes for mapping. The
//! declared descriptor comes from [`Destination::constructor`]; a
//! [`ConstructorCatalog`] decides which descriptor the validator and the
//! executor actually see.

use dashmap::DashMap;
use objmap_ir::{FromValue, Value};
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::MappingError;

/// A type that can be produced by a type map.
pub trait Destination: Sized + 'static {
    /// Fully qualified name used in diagnostics.
    fn full_name() -> &'static str {
        type_name::<Self>()
    }

    /// The constructor eligible for mapping, or `None` when the type is only
    /// populated through settable members.
    fn constructor() -> Option<ConstructorDescriptor>;

    /// Invoke the constructor.
    ///
    /// Arguments arrive in the declared parameter order. Types without a
    /// constructor receive an empty argument list.
    ///
    /// # Errors
    ///
    /// Returns an error when an argument is missing or has the wrong type.
    fn construct(args: Arguments) -> crate::Result<Self>;

    /// Names accepted by [`Destination::set_member`].
    ///
    /// When declared, member bindings are checked against this list while the
    /// configuration is built. `None` defers the check to
    /// [`Destination::set_member`] during mapping.
    fn member_names() -> Option<&'static [&'static str]> {
        None
    }

    /// Assign a settable member after construction.
    ///
    /// # Errors
    ///
    /// The default implementation rejects every member.
    fn set_member(&mut self, name: &str, value: Value) -> crate::Result<()> {
        let _ = value;
        Err(MappingError::UnknownMember {
            destination: Self::full_name().to_string(),
            member: name.to_string(),
        })
    }
}

/// One constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter identifier, exactly as declared
    pub name: String,

    /// Declared Rust type of the parameter
    pub type_name: &'static str,

    /// Value passed when nothing else resolves the parameter
    pub default: Value,
}

/// Ordered parameter list of a constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructorDescriptor {
    parameters: Vec<ParameterDescriptor>,
}

impl ConstructorDescriptor {
    /// Create a descriptor without parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter of type `T`, defaulting to `T::default()`
    #[must_use]
    pub fn parameter<T: Default + Into<Value>>(self, name: impl Into<String>) -> Self {
        self.push(name.into(), type_name::<T>(), T::default().into())
    }

    /// Append a parameter of a type without a usable default
    ///
    /// An unresolved parameter of this kind is passed as [`Value::Null`].
    #[must_use]
    pub fn parameter_without_default<T: ?Sized>(self, name: impl Into<String>) -> Self {
        self.push(name.into(), type_name::<T>(), Value::Null)
    }

    fn push(mut self, name: String, declared: &'static str, default: Value) -> Self {
        self.parameters.push(ParameterDescriptor {
            name,
            type_name: declared,
            default,
        });
        self
    }

    /// Parameters in declaration order
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Parameter names in declaration order
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Number of parameters
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Check for a parameter by exact, case-sensitive name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}

/// Type-erased handle on a destination type
#[derive(Clone, Copy)]
pub struct DestinationType {
    type_id: TypeId,
    full_name: &'static str,
    declared: fn() -> Option<ConstructorDescriptor>,
}

impl DestinationType {
    /// Handle for `D`
    #[must_use]
    pub fn of<D: Destination>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            full_name: D::full_name(),
            declared: D::constructor,
        }
    }

    /// Type identity
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name
    #[must_use]
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Constructor declared by the type itself
    #[must_use]
    pub fn declared_constructor(&self) -> Option<ConstructorDescriptor> {
        (self.declared)()
    }
}

impl fmt::Debug for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationType")
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

/// Source of constructor descriptors.
///
/// `None` means the type has no constructor usable for mapping, which is
/// distinct from a constructor without parameters.
pub trait ConstructorCatalog: Send + Sync {
    /// Describe the eligible constructor of `destination`.
    fn constructor_of(&self, destination: &DestinationType) -> Option<Arc<ConstructorDescriptor>>;
}

/// Catalog backed by [`Destination::constructor`], memoized per type
#[derive(Debug, Default)]
pub struct DeclaredCatalog {
    cache: DashMap<TypeId, Option<Arc<ConstructorDescriptor>>>,
}

impl DeclaredCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of types described so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been described yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl ConstructorCatalog for DeclaredCatalog {
    fn constructor_of(&self, destination: &DestinationType) -> Option<Arc<ConstructorDescriptor>> {
        if let Some(cached) = self.cache.get(&destination.type_id()) {
            return cached.value().clone();
        }
        self.cache
            .entry(destination.type_id())
            .or_insert_with(|| destination.declared_constructor().map(Arc::new))
            .value()
            .clone()
    }
}

/// Catalog that replaces declared descriptors by full type name
///
/// Types without an override fall through to a [`DeclaredCatalog`].
#[derive(Debug, Default)]
pub struct OverrideCatalog {
    overrides: HashMap<String, Option<Arc<ConstructorDescriptor>>>,
    fallback: DeclaredCatalog,
}

impl OverrideCatalog {
    /// Create a catalog without overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe `full_name` with the given constructor
    #[must_use]
    pub fn with_constructor(
        mut self,
        full_name: impl Into<String>,
        constructor: ConstructorDescriptor,
    ) -> Self {
        self.overrides
            .insert(full_name.into(), Some(Arc::new(constructor)));
        self
    }

    /// Describe `full_name` as having no usable constructor
    #[must_use]
    pub fn without_constructor(mut self, full_name: impl Into<String>) -> Self {
        self.overrides.insert(full_name.into(), None);
        self
    }
}

impl ConstructorCatalog for OverrideCatalog {
    fn constructor_of(&self, destination: &DestinationType) -> Option<Arc<ConstructorDescriptor>> {
        match self.overrides.get(destination.full_name()) {
            Some(descriptor) => descriptor.clone(),
            None => self.fallback.constructor_of(destination),
        }
    }
}

/// Resolved constructor arguments, in declared parameter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    /// Create an empty argument list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    /// Borrow an argument by parameter name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Take an argument and convert it to `T`
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MissingArgument`] when no such parameter was
    /// supplied and [`MappingError::Conversion`] when the value has the wrong type.
    pub fn take<T: FromValue>(&mut self, name: &str) -> crate::Result<T> {
        let slot = self
            .values
            .iter_mut()
            .find(|(param, _)| param == name)
            .ok_or_else(|| MappingError::MissingArgument {
                parameter: name.to_string(),
            })?;
        std::mem::take(&mut slot.1)
            .into_typed()
            .map_err(|reason| MappingError::Conversion {
                parameter: name.to_string(),
                reason,
            })
    }

    /// Take an argument, using `T::default()` when it resolved to null
    ///
    /// # Errors
    ///
    /// Same as [`Arguments::take`], except that null is not an error.
    pub fn take_or_default<T: FromValue + Default>(&mut self, name: &str) -> crate::Result<T> {
        Ok(self.take::<Option<T>>(name)?.unwrap_or_default())
    }

    /// Number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (parameter name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: i64,
    }

    impl Destination for Point {
        fn constructor() -> Option<ConstructorDescriptor> {
            Some(
                ConstructorDescriptor::new()
                    .parameter::<i64>("x")
                    .parameter::<i64>("y"),
            )
        }

        fn construct(mut args: Arguments) -> crate::Result<Self> {
            Ok(Self {
                x: args.take("x")?,
                y: args.take("y")?,
            })
        }
    }

    struct Bag;

    impl Destination for Bag {
        fn constructor() -> Option<ConstructorDescriptor> {
            None
        }

        fn construct(_args: Arguments) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_descriptor_preserves_declaration_order() {
        let ctor = Point::constructor().unwrap();
        assert_eq!(ctor.parameter_names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(ctor.parameter_count(), 2);
        assert_eq!(ctor.parameters()[0].type_name, "i64");
        assert_eq!(ctor.parameters()[0].default, Value::Integer(0));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let ctor = Point::constructor().unwrap();
        assert!(ctor.contains("x"));
        assert!(!ctor.contains("X"));
    }

    #[test]
    fn test_declared_catalog_distinguishes_absent_from_empty() {
        let catalog = DeclaredCatalog::new();
        assert!(catalog.constructor_of(&DestinationType::of::<Bag>()).is_none());
        let point = catalog
            .constructor_of(&DestinationType::of::<Point>())
            .unwrap();
        assert_eq!(point.parameter_count(), 2);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_declared_catalog_memoizes() {
        let catalog = DeclaredCatalog::new();
        let first = catalog
            .constructor_of(&DestinationType::of::<Point>())
            .unwrap();
        let second = catalog
            .constructor_of(&DestinationType::of::<Point>())
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_override_catalog() {
        let catalog = OverrideCatalog::new()
            .without_constructor(Point::full_name())
            .with_constructor(
                Bag::full_name(),
                ConstructorDescriptor::new().parameter::<String>("label"),
            );
        assert!(catalog.constructor_of(&DestinationType::of::<Point>()).is_none());
        assert!(
            catalog
                .constructor_of(&DestinationType::of::<Bag>())
                .unwrap()
                .contains("label")
        );
    }

    #[test]
    fn test_arguments_take() {
        let mut args = Arguments::new();
        args.push("x", Value::Integer(1));
        args.push("y", Value::Integer(2));
        let point = Point::construct(args).unwrap();
        assert_eq!((point.x, point.y), (1, 2));
    }

    #[test]
    fn test_arguments_missing_and_mistyped() {
        let mut args = Arguments::new();
        args.push("x", Value::from("one"));
        assert!(matches!(
            args.take::<i64>("y"),
            Err(MappingError::MissingArgument { .. })
        ));
        assert!(matches!(
            args.take::<i64>("x"),
            Err(MappingError::Conversion { .. })
        ));
    }

    #[test]
    fn test_take_or_default_on_null() {
        let mut args = Arguments::new();
        args.push("x", Value::Null);
        assert_eq!(args.take_or_default::<i64>("x").unwrap(), 0);
    }

    #[test]
    fn test_parameter_defaults() {
        let ctor = ConstructorDescriptor::new()
            .parameter::<String>("label")
            .parameter::<Option<i64>>("limit")
            .parameter_without_default::<Point>("origin");
        let defaults: Vec<_> = ctor.parameters().iter().map(|p| p.default.clone()).collect();
        assert_eq!(
            defaults,
            vec![Value::String(String::new()), Value::Null, Value::Null]
        );
        assert!(ctor.contains("origin"));
    }
}
