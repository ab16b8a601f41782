//! Parameter binding registry
//!
//! Holds the explicit bindings of one type map, keyed by name. A name can be
//! bound once; a second registration is rejected immediately.

use std::fmt;
use tracing::debug;

use crate::ConfigurationError;
use crate::strategy::ResolutionStrategy;

/// What a binding name refers to on the destination type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingTarget {
    /// A parameter of the destination constructor
    ConstructorParameter,
    /// A settable member assigned after construction
    Member,
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructorParameter => write!(f, "constructor parameter"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// A name bound to a resolution strategy
pub struct ParameterBinding<S> {
    name: String,
    strategy: ResolutionStrategy<S>,
}

impl<S> ParameterBinding<S> {
    /// Bound name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Strategy producing the value
    #[must_use]
    pub fn strategy(&self) -> &ResolutionStrategy<S> {
        &self.strategy
    }
}

impl<S> Clone for ParameterBinding<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            strategy: self.strategy.clone(),
        }
    }
}

impl<S> fmt::Debug for ParameterBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinding")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Bindings of one type map, in registration order
pub struct BindingRegistry<S> {
    destination: &'static str,
    target: BindingTarget,
    bindings: Vec<ParameterBinding<S>>,
}

impl<S> BindingRegistry<S> {
    /// Create an empty registry for the named destination type
    #[must_use]
    pub fn new(destination: &'static str, target: BindingTarget) -> Self {
        Self {
            destination,
            target,
            bindings: Vec::new(),
        }
    }

    /// Register a binding
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateBinding`] when `name` is already bound.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        strategy: ResolutionStrategy<S>,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ConfigurationError::DuplicateBinding {
                destination: self.destination.to_string(),
                name,
                target: self.target,
            });
        }

        debug!(
            destination = self.destination,
            kind = %self.target,
            binding = %name,
            strategy = strategy.kind(),
            "registered binding"
        );
        self.bindings.push(ParameterBinding { name, strategy });
        Ok(())
    }

    /// Look up a binding by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterBinding<S>> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// All bindings, in registration order
    #[must_use]
    pub fn bindings(&self) -> &[ParameterBinding<S>] {
        &self.bindings
    }

    /// Bound names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(ParameterBinding::name)
    }

    /// What the names refer to
    #[must_use]
    pub fn target(&self) -> BindingTarget {
        self.target
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<S> fmt::Debug for BindingRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("destination", &self.destination)
            .field("target", &self.target)
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigurationErrorKind;
    use crate::strategy::ResolutionOptions;

    struct Order {
        id: i64,
    }

    fn by_id() -> ResolutionStrategy<Order> {
        ResolutionOptions::new().map_from(|o: &Order| o.id)
    }

    #[test]
    fn test_bind_preserves_order() {
        let mut registry =
            BindingRegistry::new("shop::Invoice", BindingTarget::ConstructorParameter);
        registry.bind("number", by_id()).unwrap();
        registry.bind("reference", by_id()).unwrap();
        registry.bind("amount", by_id()).unwrap();

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["number", "reference", "amount"]
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_rejected_without_overwrite() {
        let mut registry =
            BindingRegistry::new("shop::Invoice", BindingTarget::ConstructorParameter);
        registry.bind("number", by_id()).unwrap();

        let err = registry
            .bind(
                "number",
                ResolutionOptions::new().map_from_with_context(|_: &Order, _| 0),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ConfigurationErrorKind::DuplicateBinding);
        assert_eq!(
            err.to_string(),
            "shop::Invoice already has a binding for constructor parameter 'number'."
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("number").unwrap().strategy().kind(), "projection");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = BindingRegistry::new("shop::Invoice", BindingTarget::Member);
        registry.bind("number", by_id()).unwrap();
        registry.bind("Number", by_id()).unwrap();
        assert!(registry.get("NUMBER").is_none());
        assert_eq!(registry.len(), 2);
    }
}
