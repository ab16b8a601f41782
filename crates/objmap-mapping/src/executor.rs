//! Construction executor
//!
//! Builds the argument list for a validated type map in declared parameter
//! order, invokes the constructor, then assigns member bindings.

use tracing::trace;

use crate::catalog::{Arguments, Destination};
use crate::context::ResolutionContext;
use crate::type_map::TypeMap;

/// Construct a `D` from `source`
///
/// Every argument is resolved before the constructor runs. A parameter
/// with neither a binding nor a matching source member receives its
/// declared default. Strategy and constructor errors are returned as they
/// were raised.
pub(crate) fn construct<S: 'static, D: Destination>(
    map: &TypeMap<S, D>,
    source: &S,
    context: &mut ResolutionContext<'_>,
) -> crate::Result<D> {
    let mut arguments = Arguments::new();

    if let Some(constructor) = map.constructor() {
        let conventions = context.settings().conventions;
        for parameter in constructor.parameters() {
            let value = match map.ctor_param_bindings().get(&parameter.name) {
                Some(binding) => binding.strategy().resolve(source, context)?,
                None => map
                    .resolve_by_convention(source, &parameter.name, conventions)
                    .unwrap_or_else(|| parameter.default.clone()),
            };
            trace!(
                destination = D::full_name(),
                parameter = %parameter.name,
                value = ?value,
                "resolved constructor argument"
            );
            arguments.push(parameter.name.clone(), value);
        }
    }

    let mut destination = D::construct(arguments)?;

    for binding in map.member_bindings().bindings() {
        let value = binding.strategy().resolve(source, context)?;
        destination.set_member(binding.name(), value)?;
    }

    Ok(destination)
}
