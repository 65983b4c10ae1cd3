//! # Bootkit Core Configuration Errors
//!
//! Defines [`ConfigError`], covering every way a configuration value can be
//! rejected: the boot document cannot be read or decoded, a section does not
//! have the expected shape, a decoded value does not match a plugin's typed
//! configuration, or a factory's validator refuses it.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read boot configuration '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "yaml-config")]
    #[error("Failed to parse YAML document: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[cfg(feature = "yaml-config")]
    #[error("Failed to decode section '{section}': {source}")]
    Section {
        section: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config value does not match the expected type for '{expected}': {source}")]
    TypeMismatch {
        expected: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode config for '{plugin_type}': {source}")]
    Encode {
        plugin_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    /// Validator rejection with a human readable reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid { reason: reason.into() }
    }
}
