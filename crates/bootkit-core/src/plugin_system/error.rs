//! # Bootkit Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], covering every way the registry or a plugin
//! instance can refuse an operation: duplicate or unknown identifiers,
//! rejected configuration, failed creation or reload, and lifecycle failures
//! reported by the plugins themselves.
use crate::config::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin instance already exists: {instance_id}")]
    DuplicateInstance { instance_id: String },

    #[error("Plugin factory not found: {plugin_type}")]
    UnknownFactory { plugin_type: String },

    #[error("Config validation failed for '{plugin_type}': {source}")]
    InvalidConfig {
        plugin_type: String,
        #[source]
        source: ConfigError,
    },

    #[error("Failed to create plugin instance '{instance_id}': {source}")]
    CreationFailed {
        instance_id: String,
        #[source]
        source: Box<PluginSystemError>,
    },

    #[error("Plugin instance not found: {instance_id}")]
    NotFound { instance_id: String },

    #[error("Failed to reload plugin '{plugin_id}': {source}")]
    ReloadFailed {
        plugin_id: String,
        #[source]
        source: Box<PluginSystemError>,
    },

    #[error("Plugin {operation} error for '{plugin_id}': {message}")]
    Lifecycle {
        plugin_id: String,
        operation: String,
        message: String,
    },

    #[error("Plugin '{plugin_id}' is already running")]
    AlreadyRunning { plugin_id: String },
}

impl PluginSystemError {
    /// Lifecycle failure reported by a plugin during `operation` (start, stop, reload...).
    pub fn lifecycle(
        plugin_id: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PluginSystemError::Lifecycle {
            plugin_id: plugin_id.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Shorthand for results of plugin system operations.
pub type Result<T> = std::result::Result<T, PluginSystemError>;
