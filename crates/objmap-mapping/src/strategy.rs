//! Resolution strategies
//!
//! A strategy produces the value of one constructor parameter (or member)
//! from the source instance, optionally consulting the per-call
//! [`ResolutionContext`].

use objmap_ir::Value;
use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::MappingError;
use crate::context::ResolutionContext;

/// Type alias for a projection of the source instance
pub type ProjectionFn<S> = Arc<dyn Fn(&S) -> crate::Result<Value> + Send + Sync>;

/// Type alias for a function of the source instance and the mapping context
pub type ContextualFn<S> =
    Arc<dyn Fn(&S, &mut ResolutionContext<'_>) -> crate::Result<Value> + Send + Sync>;

/// How a bound value is computed
pub enum ResolutionStrategy<S> {
    /// Pure function of the source instance
    Projection(ProjectionFn<S>),

    /// Function of the source instance and the mapping context
    ContextualFunction(ContextualFn<S>),
}

impl<S> ResolutionStrategy<S> {
    /// Evaluate the strategy
    ///
    /// # Errors
    ///
    /// Errors raised by the strategy body are returned unchanged.
    pub fn resolve(&self, source: &S, context: &mut ResolutionContext<'_>) -> crate::Result<Value> {
        match self {
            Self::Projection(projection) => projection(source),
            Self::ContextualFunction(function) => function(source, context),
        }
    }

    /// Variant name, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Projection(_) => "projection",
            Self::ContextualFunction(_) => "contextual function",
        }
    }
}

impl<S> Clone for ResolutionStrategy<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Projection(projection) => Self::Projection(Arc::clone(projection)),
            Self::ContextualFunction(function) => Self::ContextualFunction(Arc::clone(function)),
        }
    }
}

impl<S> fmt::Debug for ResolutionStrategy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolutionStrategy::{}", self.kind())
    }
}

/// Factory handed to `for_ctor_param` / `for_member` configure callbacks
pub struct ResolutionOptions<S> {
    _source: PhantomData<fn(&S)>,
}

impl<S> ResolutionOptions<S> {
    /// Create the factory
    #[must_use]
    pub fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }

    /// Project a value out of the source instance
    #[must_use]
    pub fn map_from<F, V>(self, projection: F) -> ResolutionStrategy<S>
    where
        F: Fn(&S) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        ResolutionStrategy::Projection(Arc::new(move |source: &S| -> crate::Result<Value> {
            Ok(projection(source).into())
        }))
    }

    /// Project a value out of the source instance, allowing failure
    #[must_use]
    pub fn try_map_from<F, V>(self, projection: F) -> ResolutionStrategy<S>
    where
        F: Fn(&S) -> crate::Result<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        ResolutionStrategy::Projection(Arc::new(move |source: &S| -> crate::Result<Value> {
            projection(source).map(Into::into)
        }))
    }

    /// Compute a value from the source instance and the mapping context
    #[must_use]
    pub fn map_from_with_context<F, V>(self, function: F) -> ResolutionStrategy<S>
    where
        F: Fn(&S, &mut ResolutionContext<'_>) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        ResolutionStrategy::ContextualFunction(Arc::new(
            move |source: &S, context: &mut ResolutionContext<'_>| -> crate::Result<Value> {
                Ok(function(source, context).into())
            },
        ))
    }

    /// Compute a value from the source instance and the mapping context, allowing failure
    #[must_use]
    pub fn try_map_from_with_context<F, V>(self, function: F) -> ResolutionStrategy<S>
    where
        F: Fn(&S, &mut ResolutionContext<'_>) -> crate::Result<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        ResolutionStrategy::ContextualFunction(Arc::new(
            move |source: &S, context: &mut ResolutionContext<'_>| -> crate::Result<Value> {
                function(source, context).map(Into::into)
            },
        ))
    }

    /// Always resolve to the same value
    #[must_use]
    pub fn use_value<V>(self, value: V) -> ResolutionStrategy<S>
    where
        V: Into<Value> + Clone + Send + Sync + 'static,
    {
        ResolutionStrategy::Projection(Arc::new(move |_: &S| -> crate::Result<Value> {
            Ok(value.clone().into())
        }))
    }
}

impl<S: Any> ResolutionOptions<S> {
    /// Project a value out of a weakly typed source
    ///
    /// The projection sees the source as `&dyn Any` and downcasts it itself,
    /// usually through [`downcast_source`]. A failed downcast surfaces when
    /// the map runs, not when the configuration is built.
    #[must_use]
    pub fn map_from_dyn<F, V>(self, projection: F) -> ResolutionStrategy<S>
    where
        F: Fn(&dyn Any) -> crate::Result<V> + Send + Sync + 'static,
        V: Into<Value>,
    {
        ResolutionStrategy::Projection(Arc::new(move |source: &S| -> crate::Result<Value> {
            projection(source as &dyn Any).map(Into::into)
        }))
    }
}

impl<S> Default for ResolutionOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Downcast a weakly typed source to `T`
///
/// # Errors
///
/// Returns [`MappingError::SourceType`] when the source is not a `T`.
pub fn downcast_source<T: Any>(source: &dyn Any) -> crate::Result<&T> {
    source
        .downcast_ref::<T>()
        .ok_or_else(|| MappingError::SourceType {
            expected: type_name::<T>().to_string(),
        })
}
