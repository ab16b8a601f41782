#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # objmap-mapping
//!
//! Constructor parameter binding for object-to-object mappings.
//!
//! Destination types that are built through a parameterized constructor
//! declare that constructor through [`Destination`]. A type map binds
//! constructor parameters by name to resolution strategies; the bindings are
//! checked against the declared constructor when the configuration is built,
//! so a misspelt parameter fails at startup instead of on the first mapping.
//!
//! ## Example Usage
//!
//! ```rust
//! use objmap_mapping::{Arguments, ConstructorDescriptor, Destination, MapperConfiguration};
//!
//! struct Source {
//!     value: i32,
//! }
//!
//! #[derive(Debug)]
//! struct Dest {
//!     value1: i32,
//! }
//!
//! impl Destination for Dest {
//!     fn constructor() -> Option<ConstructorDescriptor> {
//!         Some(ConstructorDescriptor::new().parameter::<i32>("thing"))
//!     }
//!
//!     fn construct(mut args: Arguments) -> objmap_mapping::Result<Self> {
//!         Ok(Self { value1: args.take("thing")? })
//!     }
//! }
//!
//! let config = MapperConfiguration::new(|cfg| {
//!     cfg.create_map::<Source, Dest>(|map| {
//!         map.for_ctor_param("thing", |opt| opt.map_from(|src: &Source| src.value))?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let mapper = config.create_mapper();
//! let dest: Dest = mapper.map(&Source { value: 5 }).unwrap();
//! assert_eq!(dest.value1, 5);
//! ```

pub mod bindings;
pub mod catalog;
pub mod config;
pub mod context;
mod executor;
pub mod mapper;
pub mod settings;
pub mod strategy;
pub mod type_map;
pub mod validator;

pub use bindings::{BindingRegistry, BindingTarget, ParameterBinding};
pub use catalog::{
    Arguments, ConstructorCatalog, ConstructorDescriptor, DeclaredCatalog, Destination,
    DestinationType, OverrideCatalog, ParameterDescriptor,
};
pub use config::{MapperConfiguration, MapperConfigurationBuilder};
pub use context::{Items, ResolutionContext};
pub use mapper::{Mapper, MappingOptions};
pub use objmap_ir::{FromValue, Members, Value};
pub use settings::{ConventionSettings, MapperSettings, SettingsError};
pub use strategy::{ResolutionOptions, ResolutionStrategy, downcast_source};
pub use type_map::TypeMap;

use std::fmt;
use thiserror::Error;

/// Configuration-time failures, raised while registering or validating type maps
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{destination} does not have a constructor.")]
    NoConstructor { destination: String },

    #[error("{destination} does not have a constructor with a parameter named '{parameter}'.")]
    UnknownCtorParam {
        destination: String,
        parameter: String,
    },

    #[error("{destination} does not have a settable member named '{member}'.")]
    UnknownMember { destination: String, member: String },

    #[error("{destination} already has a binding for {target} '{name}'.")]
    DuplicateBinding {
        destination: String,
        name: String,
        target: BindingTarget,
    },

    #[error("A type map from {source_type} to {destination} is already registered.")]
    DuplicateTypeMap {
        source_type: String,
        destination: String,
    },
}

/// Discriminant of a [`ConfigurationError`], for branching without matching on fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationErrorKind {
    NoConstructor,
    UnknownCtorParam,
    UnknownMember,
    DuplicateBinding,
    DuplicateTypeMap,
}

impl ConfigurationError {
    /// Kind of this error
    #[must_use]
    pub fn kind(&self) -> ConfigurationErrorKind {
        match self {
            Self::NoConstructor { .. } => ConfigurationErrorKind::NoConstructor,
            Self::UnknownCtorParam { .. } => ConfigurationErrorKind::UnknownCtorParam,
            Self::UnknownMember { .. } => ConfigurationErrorKind::UnknownMember,
            Self::DuplicateBinding { .. } => ConfigurationErrorKind::DuplicateBinding,
            Self::DuplicateTypeMap { .. } => ConfigurationErrorKind::DuplicateTypeMap,
        }
    }

    /// Fully qualified name of the destination type the error refers to
    #[must_use]
    pub fn destination(&self) -> &str {
        match self {
            Self::NoConstructor { destination }
            | Self::UnknownCtorParam { destination, .. }
            | Self::UnknownMember { destination, .. }
            | Self::DuplicateBinding { destination, .. }
            | Self::DuplicateTypeMap { destination, .. } => destination,
        }
    }
}

/// Every configuration error found while building a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationErrors {
    errors: Vec<ConfigurationError>,
}

impl ConfigurationErrors {
    /// Wrap a list of errors
    #[must_use]
    pub fn new(errors: Vec<ConfigurationError>) -> Self {
        Self { errors }
    }

    /// All errors, in type map registration order
    #[must_use]
    pub fn errors(&self) -> &[ConfigurationError] {
        &self.errors
    }

    /// First error reported
    #[must_use]
    pub fn first(&self) -> Option<&ConfigurationError> {
        self.errors.first()
    }

    /// Check whether an error of the given kind was reported
    #[must_use]
    pub fn contains(&self, kind: ConfigurationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    /// Number of errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are no errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<ConfigurationError> for ConfigurationErrors {
    fn from(error: ConfigurationError) -> Self {
        Self::new(vec![error])
    }
}

impl fmt::Display for ConfigurationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mapper configuration is invalid:")?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationErrors {}

/// Transformation-time failures, raised while mapping a source instance
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Missing type map configuration: {source_type} -> {destination}")]
    MissingTypeMap {
        source_type: String,
        destination: String,
    },

    #[error("No argument named '{parameter}' was supplied")]
    MissingArgument { parameter: String },

    #[error("Cannot convert argument '{parameter}': {reason}")]
    Conversion {
        parameter: String,
        #[source]
        reason: objmap_ir::Error,
    },

    #[error("Source value is not of type {expected}")]
    SourceType { expected: String },

    #[error("{destination} has no settable member named '{member}'")]
    UnknownMember { destination: String, member: String },

    #[error("No item with key '{key}' in the mapping context")]
    MissingItem { key: String },

    #[error("Maximum mapping depth of {max_depth} exceeded")]
    MaxDepthExceeded { max_depth: usize },

    #[error("Value error: {0}")]
    Value(#[from] objmap_ir::Error),

    #[error("Resolution error: {0}")]
    Resolution(String),
}

/// Result type for transformation-time operations
pub type Result<T> = std::result::Result<T, MappingError>;
