use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ConfigError;
use crate::kernel::scope::Scope;
use crate::logging::SharedLogger;
use crate::plugin_system::error::Result;
use crate::plugin_system::status::{PluginStatus, StatusStream};

/// Bounds every typed plugin configuration satisfies. Blanket-implemented.
pub trait PluginConfig:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> PluginConfig for T where
    T: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// A configurable, restartable unit of business logic.
///
/// Plugins own their runtime state; configuration of record is kept by the
/// wrapping [`PluginInstance`](crate::plugin_system::PluginInstance).
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    type Config: PluginConfig;

    /// Instance id, unique within a registry.
    fn id(&self) -> &str;

    /// Plugin type name, e.g. `"announcement"`.
    fn plugin_type(&self) -> &str;

    fn version(&self) -> &str;

    /// Start background work. Should move the status to `Running` on success.
    async fn start(&self, scope: &Scope) -> Result<()>;

    /// Stop background work within the scope's budget. Should move the
    /// status to `Stopped` on success.
    async fn stop(&self, scope: &Scope) -> Result<()>;

    /// Apply an already validated configuration, restarting internals as needed.
    ///
    /// On failure the plugin should try to get back to running the previous
    /// configuration; the caller restores its own configuration of record.
    async fn reload(&self, config: Self::Config) -> Result<()>;

    fn status(&self) -> PluginStatus;

    /// Status change stream. Single subscriber: later calls return `None`.
    fn status_notify(&self) -> Option<StatusStream>;

    fn logger(&self) -> SharedLogger;

    fn set_logger(&self, logger: SharedLogger);
}

/// Builds plugins of one type and owns their configuration policy.
pub trait PluginFactory: Send + Sync + 'static {
    type Config: PluginConfig;
    type Plugin: Plugin<Config = Self::Config>;

    /// Plugin type name this factory is registered under.
    fn plugin_type(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn default_config(&self) -> Self::Config;

    /// Reject configurations the plugin cannot run with.
    fn validate_config(&self, config: &Self::Config) -> std::result::Result<(), ConfigError>;

    /// Build a plugin. `config` has already passed [`PluginFactory::validate_config`].
    fn create(&self, instance_id: &str, config: Self::Config, logger: SharedLogger) -> Result<Self::Plugin>;
}
