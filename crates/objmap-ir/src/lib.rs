#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # objmap-ir
//!
//! Value model shared by the object mapping engine.
//!
//! Resolution strategies produce [`Value`]s, constructors consume them, and
//! the per-call `Items` store holds them. Source types expose their members
//! by name through the [`Members`] trait so unbound constructor parameters
//! can be filled by convention.

/// Name-based read access to source members.
pub mod members;
/// Dynamic values and conversions to and from Rust scalars.
pub mod value;

pub use members::{Members, find_member};
pub use value::{FromValue, Value};

use thiserror::Error;

/// Errors that can occur when converting values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Conversion error in {context}: {message}")]
    Conversion { context: String, message: String },
}

impl Error {
    /// Build a type-mismatch error from the expected type and the offending value.
    pub fn type_mismatch(expected: impl Into<String>, found: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.type_name().to_string(),
        }
    }

    /// Build a conversion error with conversion context.
    pub fn conversion(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
