use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::ConfigError;
use crate::kernel::component::IntoAnyArc;
use crate::kernel::scope::Scope;
use crate::logging::SharedLogger;
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::status::{PluginStatus, StatusStream};
use crate::plugin_system::traits::{Plugin, PluginFactory};

/// Registry-side wrapper around one plugin.
///
/// Keeps the configuration of record: the last value that passed the
/// factory's validator and was accepted by the plugin's `reload`.
pub struct PluginInstance<F: PluginFactory> {
    id: String,
    plugin_type: String,
    plugin: Arc<F::Plugin>,
    config: RwLock<F::Config>,
    factory: Arc<F>,
}

impl<F: PluginFactory> fmt::Debug for PluginInstance<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.id)
            .field("plugin_type", &self.plugin_type)
            .field("status", &self.plugin.status())
            .finish()
    }
}

impl<F: PluginFactory> PluginInstance<F> {
    pub fn new(id: impl Into<String>, plugin: F::Plugin, config: F::Config, factory: Arc<F>) -> Self {
        Self {
            id: id.into(),
            plugin_type: factory.plugin_type().to_string(),
            plugin: Arc::new(plugin),
            config: RwLock::new(config),
            factory,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    pub fn plugin(&self) -> &Arc<F::Plugin> {
        &self.plugin
    }

    /// Copy of the configuration of record.
    pub async fn config(&self) -> F::Config {
        self.config.read().await.clone()
    }

    /// Validate, apply and, if the plugin rejects it, roll back.
    ///
    /// The write lock is held for the whole sequence, so readers never see a
    /// value that is about to be rolled back.
    pub async fn update_config(&self, new_config: F::Config) -> Result<()> {
        let mut current = self.config.write().await;

        self.factory
            .validate_config(&new_config)
            .map_err(|source| PluginSystemError::InvalidConfig {
                plugin_type: self.plugin_type.clone(),
                source,
            })?;

        let previous = std::mem::replace(&mut *current, new_config.clone());
        if let Err(e) = self.plugin.reload(new_config).await {
            *current = previous;
            return Err(PluginSystemError::ReloadFailed {
                plugin_id: self.id.clone(),
                source: Box::new(e),
            });
        }
        Ok(())
    }

    pub async fn start(&self, scope: &Scope) -> Result<()> {
        self.plugin.start(scope).await
    }

    pub async fn stop(&self, scope: &Scope) -> Result<()> {
        self.plugin.stop(scope).await
    }

    pub fn status(&self) -> PluginStatus {
        self.plugin.status()
    }

    pub fn status_notify(&self) -> Option<StatusStream> {
        self.plugin.status_notify()
    }

    pub fn logger(&self) -> SharedLogger {
        self.plugin.logger()
    }

    pub fn set_logger(&self, logger: SharedLogger) {
        self.plugin.set_logger(logger);
    }
}

/// Type-erased view of a [`PluginInstance`], as stored by the registry.
/// Configuration crosses this boundary as a `serde_json::Value`.
#[async_trait]
pub trait AnyPluginInstance: IntoAnyArc {
    fn id(&self) -> &str;
    fn plugin_type(&self) -> &str;
    fn version(&self) -> &str;
    async fn start(&self, scope: &Scope) -> Result<()>;
    async fn stop(&self, scope: &Scope) -> Result<()>;
    fn status(&self) -> PluginStatus;
    fn status_notify(&self) -> Option<StatusStream>;
    fn logger(&self) -> SharedLogger;
    fn set_logger(&self, logger: SharedLogger);

    /// Configuration of record, encoded.
    async fn config_value(&self) -> std::result::Result<Value, ConfigError>;

    /// Erased [`PluginInstance::update_config`]. A value that does not decode
    /// into the plugin's config type is rejected as `InvalidConfig`.
    async fn update_config_value(&self, config: Value) -> Result<()>;
}

#[async_trait]
impl<F: PluginFactory> AnyPluginInstance for PluginInstance<F> {
    fn id(&self) -> &str {
        &self.id
    }

    fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    fn version(&self) -> &str {
        self.plugin.version()
    }

    async fn start(&self, scope: &Scope) -> Result<()> {
        self.plugin.start(scope).await
    }

    async fn stop(&self, scope: &Scope) -> Result<()> {
        self.plugin.stop(scope).await
    }

    fn status(&self) -> PluginStatus {
        self.plugin.status()
    }

    fn status_notify(&self) -> Option<StatusStream> {
        self.plugin.status_notify()
    }

    fn logger(&self) -> SharedLogger {
        self.plugin.logger()
    }

    fn set_logger(&self, logger: SharedLogger) {
        self.plugin.set_logger(logger);
    }

    async fn config_value(&self) -> std::result::Result<Value, ConfigError> {
        let config = self.config().await;
        encode_config(&self.plugin_type, &config)
    }

    async fn update_config_value(&self, config: Value) -> Result<()> {
        let typed = decode_config::<F::Config>(&self.plugin_type, config).map_err(|source| {
            PluginSystemError::InvalidConfig {
                plugin_type: self.plugin_type.clone(),
                source,
            }
        })?;
        self.update_config(typed).await
    }
}

pub(crate) fn decode_config<C: serde::de::DeserializeOwned>(
    plugin_type: &str,
    value: Value,
) -> std::result::Result<C, ConfigError> {
    serde_json::from_value(value).map_err(|source| ConfigError::TypeMismatch {
        expected: plugin_type.to_string(),
        source,
    })
}

pub(crate) fn encode_config<C: serde::Serialize>(
    plugin_type: &str,
    config: &C,
) -> std::result::Result<Value, ConfigError> {
    serde_json::to_value(config).map_err(|source| ConfigError::Encode {
        plugin_type: plugin_type.to_string(),
        source,
    })
}
