use std::sync::Arc;

use serde_json::Value;

use crate::config::ConfigError;
use crate::logging::SharedLogger;
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::instance::{decode_config, encode_config, AnyPluginInstance, PluginInstance};
use crate::plugin_system::traits::PluginFactory;

/// Type-erased [`PluginFactory`], as stored by the registry.
pub trait AnyPluginFactory: Send + Sync {
    fn plugin_type(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str;

    fn default_config_value(&self) -> std::result::Result<Value, ConfigError>;

    /// Decode `config` into the factory's config type and run its validator.
    fn validate_config_value(&self, config: &Value) -> std::result::Result<(), ConfigError>;

    /// Create the plugin and wrap it in a [`PluginInstance`].
    fn instantiate(
        self: Arc<Self>,
        instance_id: &str,
        config: Value,
        logger: SharedLogger,
    ) -> Result<Arc<dyn AnyPluginInstance>>;
}

impl<F: PluginFactory> AnyPluginFactory for F {
    fn plugin_type(&self) -> &str {
        PluginFactory::plugin_type(self)
    }

    fn version(&self) -> &str {
        PluginFactory::version(self)
    }

    fn description(&self) -> &str {
        PluginFactory::description(self)
    }

    fn default_config_value(&self) -> std::result::Result<Value, ConfigError> {
        encode_config(PluginFactory::plugin_type(self), &self.default_config())
    }

    fn validate_config_value(&self, config: &Value) -> std::result::Result<(), ConfigError> {
        let typed: F::Config = decode_config(PluginFactory::plugin_type(self), config.clone())?;
        self.validate_config(&typed)
    }

    fn instantiate(
        self: Arc<Self>,
        instance_id: &str,
        config: Value,
        logger: SharedLogger,
    ) -> Result<Arc<dyn AnyPluginInstance>> {
        let plugin_type = PluginFactory::plugin_type(self.as_ref()).to_string();
        let typed: F::Config = decode_config(&plugin_type, config)
            .map_err(|source| PluginSystemError::InvalidConfig { plugin_type, source })?;

        let plugin = self
            .create(instance_id, typed.clone(), logger)
            .map_err(|e| PluginSystemError::CreationFailed {
                instance_id: instance_id.to_string(),
                source: Box::new(e),
            })?;

        Ok(Arc::new(PluginInstance::new(instance_id, plugin, typed, self)))
    }
}
