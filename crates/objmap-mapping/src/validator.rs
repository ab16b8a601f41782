//! Configuration validator
//!
//! Cross-checks constructor parameter bindings against the destination's
//! constructor. Runs when a configuration is built; nothing is mapped with a
//! type map that failed here.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::ConfigurationError;
use crate::bindings::BindingRegistry;
use crate::catalog::{ConstructorCatalog, ConstructorDescriptor, DestinationType};

/// Validate the constructor parameter bindings of one type map
///
/// Returns the constructor the executor must follow, or `None` when the
/// destination has no constructor and nothing is bound to one. Stops at the
/// first binding that does not name a parameter.
///
/// # Errors
///
/// - [`ConfigurationError::NoConstructor`] when bindings exist but the
///   destination has no usable constructor.
/// - [`ConfigurationError::UnknownCtorParam`] when a bound name is not a
///   parameter of the constructor (exact, case-sensitive comparison).
pub fn validate_constructor_bindings<S>(
    destination: &DestinationType,
    bindings: &BindingRegistry<S>,
    catalog: &dyn ConstructorCatalog,
) -> Result<Option<Arc<ConstructorDescriptor>>, ConfigurationError> {
    let Some(constructor) = catalog.constructor_of(destination) else {
        if bindings.is_empty() {
            debug!(destination = destination.full_name(), "no constructor, no bindings");
            return Ok(None);
        }
        warn!(
            destination = destination.full_name(),
            bindings = bindings.len(),
            "constructor parameters bound on a type without a constructor"
        );
        return Err(ConfigurationError::NoConstructor {
            destination: destination.full_name().to_string(),
        });
    };

    if let Some(unknown) = bindings
        .bindings()
        .iter()
        .find(|binding| !constructor.contains(binding.name()))
    {
        warn!(
            destination = destination.full_name(),
            parameter = unknown.name(),
            "bound name is not a constructor parameter"
        );
        return Err(ConfigurationError::UnknownCtorParam {
            destination: destination.full_name().to_string(),
            parameter: unknown.name().to_string(),
        });
    }

    debug!(
        destination = destination.full_name(),
        parameters = constructor.parameter_count(),
        bound = bindings.len(),
        "constructor bindings validated"
    );
    Ok(Some(constructor))
}

/// Validate the member bindings of one type map
///
/// Only runs when the destination declares its member names.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownMember`] for the first bound name
/// missing from `declared`.
pub fn validate_member_bindings<S>(
    destination: &DestinationType,
    bindings: &BindingRegistry<S>,
    declared: Option<&[&str]>,
) -> Result<(), ConfigurationError> {
    let Some(declared) = declared else {
        return Ok(());
    };

    match bindings.names().find(|name| !declared.contains(name)) {
        Some(unknown) => {
            warn!(
                destination = destination.full_name(),
                member = unknown,
                "bound name is not a settable member"
            );
            Err(ConfigurationError::UnknownMember {
                destination: destination.full_name().to_string(),
                member: unknown.to_string(),
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigurationErrorKind;
    use crate::bindings::BindingTarget;
    use crate::catalog::{Arguments, DeclaredCatalog, Destination, OverrideCatalog};
    use crate::strategy::ResolutionOptions;

    struct Source {
        value: i32,
    }

    struct Dest;

    impl Destination for Dest {
        fn constructor() -> Option<ConstructorDescriptor> {
            Some(ConstructorDescriptor::new().parameter::<i32>("thing"))
        }

        fn construct(_args: Arguments) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    struct NoCtor;

    impl Destination for NoCtor {
        fn constructor() -> Option<ConstructorDescriptor> {
            None
        }

        fn construct(_args: Arguments) -> crate::Result<Self> {
            Ok(Self)
        }
    }

    fn registry<D: Destination>(names: &[&str]) -> BindingRegistry<Source> {
        let mut registry =
            BindingRegistry::new(D::full_name(), BindingTarget::ConstructorParameter);
        for name in names {
            registry
                .bind(*name, ResolutionOptions::new().map_from(|s: &Source| s.value))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_matching_bindings_pass() {
        let ctor = validate_constructor_bindings(
            &DestinationType::of::<Dest>(),
            &registry::<Dest>(&["thing"]),
            &DeclaredCatalog::new(),
        )
        .unwrap()
        .unwrap();
        assert!(ctor.contains("thing"));
    }

    #[test]
    fn test_unknown_parameter_reports_first_mismatch() {
        let err = validate_constructor_bindings(
            &DestinationType::of::<Dest>(),
            &registry::<Dest>(&["thing", "think", "thin"]),
            &DeclaredCatalog::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownCtorParam {
                destination: Dest::full_name().to_string(),
                parameter: "think".to_string(),
            }
        );
        assert!(
            err.to_string()
                .contains("does not have a constructor with a parameter named 'think'.")
        );
    }

    #[test]
    fn test_case_mismatch_is_unknown() {
        let err = validate_constructor_bindings(
            &DestinationType::of::<Dest>(),
            &registry::<Dest>(&["Thing"]),
            &DeclaredCatalog::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ConfigurationErrorKind::UnknownCtorParam);
    }

    #[test]
    fn test_no_constructor_with_bindings() {
        let err = validate_constructor_bindings(
            &DestinationType::of::<NoCtor>(),
            &registry::<NoCtor>(&["thing"]),
            &DeclaredCatalog::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ConfigurationErrorKind::NoConstructor);
        assert!(err.to_string().contains("does not have a constructor."));
        assert!(err.to_string().contains(NoCtor::full_name()));
    }

    #[test]
    fn test_no_constructor_without_bindings_is_fine() {
        let ctor = validate_constructor_bindings(
            &DestinationType::of::<NoCtor>(),
            &registry::<NoCtor>(&[]),
            &DeclaredCatalog::new(),
        )
        .unwrap();
        assert!(ctor.is_none());
    }

    #[test]
    fn test_catalog_decides_over_declaration() {
        let catalog = OverrideCatalog::new().without_constructor(Dest::full_name());
        let err = validate_constructor_bindings(
            &DestinationType::of::<Dest>(),
            &registry::<Dest>(&["thing"]),
            &catalog,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ConfigurationErrorKind::NoConstructor);
    }

    #[test]
    fn test_member_bindings_checked_when_declared() {
        let mut members = BindingRegistry::new(NoCtor::full_name(), BindingTarget::Member);
        members
            .bind("label", ResolutionOptions::new().map_from(|s: &Source| s.value))
            .unwrap();
        let destination = DestinationType::of::<NoCtor>();

        assert!(validate_member_bindings(&destination, &members, Some(&["label"])).is_ok());
        assert!(validate_member_bindings(&destination, &members, None).is_ok());

        let err = validate_member_bindings(&destination, &members, Some(&["title"])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownMember {
                destination: NoCtor::full_name().to_string(),
                member: "label".to_string(),
            }
        );
    }

    #[test]
    fn test_validation_is_repeatable() {
        let bindings = registry::<Dest>(&["think"]);
        let catalog = DeclaredCatalog::new();
        let destination = DestinationType::of::<Dest>();
        let first = validate_constructor_bindings(&destination, &bindings, &catalog);
        let second = validate_constructor_bindings(&destination, &bindings, &catalog);
        assert_eq!(first.unwrap_err(), second.unwrap_err());
    }
}
