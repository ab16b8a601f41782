//! Mapper settings
//!
//! Settings can be built in code or loaded from YAML:
//!
//! ```yaml
//! conventions:
//!   enabled: true
//!   ignore_case: true
//! max_depth: 32
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {message}")]
    Parse {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
}

/// How unbound constructor parameters are matched against source members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionSettings {
    /// Fill unbound parameters from source members at all
    pub enabled: bool,
    /// Accept a member whose name differs from the parameter only in ASCII case
    pub ignore_case: bool,
}

impl Default for ConventionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ignore_case: true,
        }
    }
}

/// Settings shared by every type map of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    /// Convention-based parameter resolution
    pub conventions: ConventionSettings,
    /// Maximum nesting of maps started from contextual functions
    pub max_depth: usize,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            conventions: ConventionSettings::default(),
            max_depth: 32,
        }
    }
}

impl MapperSettings {
    /// Parse settings from YAML
    ///
    /// # Errors
    ///
    /// Returns an error when YAML parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        serde_yaml::from_str(yaml).map_err(|e| SettingsError::Parse {
            message: e.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
        })
    }

    /// Load settings from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize settings to YAML
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_yaml(&self) -> Result<String, SettingsError> {
        serde_yaml::to_string(self).map_err(|e| SettingsError::Parse {
            message: e.to_string(),
            line: None,
            column: None,
        })
    }
}
