use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::kernel::scope::Scope;
use crate::logging::SharedLogger;
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::status::{PluginStatus, StatusStream, StatusTracker};
use crate::plugin_system::traits::{Plugin, PluginFactory};

pub(super) const COUNTER_TYPE: &str = "counter";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct CounterConfig {
    pub label: String,
    pub step: u32,
    /// Makes `reload` fail, to exercise rollback.
    #[serde(default)]
    pub fail_reload: bool,
}

impl CounterConfig {
    pub(super) fn new(label: &str, step: u32) -> Self {
        Self {
            label: label.to_string(),
            step,
            fail_reload: false,
        }
    }
}

/// Minimal plugin: tracks status and remembers what `reload` was given.
pub(super) struct CounterPlugin {
    id: String,
    tracker: StatusTracker,
    applied: Mutex<CounterConfig>,
    logger: RwLock<SharedLogger>,
    running: AtomicBool,
    pub(super) reloads: AtomicUsize,
}

impl CounterPlugin {
    pub(super) fn applied(&self) -> CounterConfig {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl Plugin for CounterPlugin {
    type Config = CounterConfig;

    fn id(&self) -> &str {
        &self.id
    }

    fn plugin_type(&self) -> &str {
        COUNTER_TYPE
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    async fn start(&self, _scope: &Scope) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PluginSystemError::AlreadyRunning {
                plugin_id: self.id.clone(),
            });
        }
        self.tracker.set(PluginStatus::Running, None);
        Ok(())
    }

    async fn stop(&self, _scope: &Scope) -> Result<()> {
        if self.running.swap(false, Ordering::SeqCst) {
            self.tracker.set(PluginStatus::Stopped, None);
        }
        Ok(())
    }

    async fn reload(&self, config: CounterConfig) -> Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if config.fail_reload {
            let err = PluginSystemError::lifecycle(&self.id, "reload", "refused new config");
            self.tracker.set(
                PluginStatus::Error,
                Some(PluginSystemError::lifecycle(&self.id, "reload", "refused new config")),
            );
            return Err(err);
        }
        *self.applied.lock().unwrap() = config;
        Ok(())
    }

    fn status(&self) -> PluginStatus {
        self.tracker.status()
    }

    fn status_notify(&self) -> Option<StatusStream> {
        self.tracker.subscribe()
    }

    fn logger(&self) -> SharedLogger {
        self.logger.read().unwrap().clone()
    }

    fn set_logger(&self, logger: SharedLogger) {
        *self.logger.write().unwrap() = logger;
    }
}

#[derive(Default)]
pub(super) struct CounterFactory {
    pub fail_create: bool,
}

impl PluginFactory for CounterFactory {
    type Config = CounterConfig;
    type Plugin = CounterPlugin;

    fn plugin_type(&self) -> &str {
        COUNTER_TYPE
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn description(&self) -> &str {
        "counts things"
    }

    fn default_config(&self) -> CounterConfig {
        CounterConfig::new("default", 1)
    }

    fn validate_config(&self, config: &CounterConfig) -> std::result::Result<(), ConfigError> {
        if config.label.trim().is_empty() {
            return Err(ConfigError::invalid("label is required"));
        }
        if config.step == 0 {
            return Err(ConfigError::invalid("step must be positive"));
        }
        Ok(())
    }

    fn create(&self, instance_id: &str, config: CounterConfig, logger: SharedLogger) -> Result<CounterPlugin> {
        if self.fail_create {
            return Err(PluginSystemError::lifecycle(instance_id, "create", "factory refused"));
        }
        Ok(CounterPlugin {
            id: instance_id.to_string(),
            tracker: StatusTracker::new(instance_id),
            applied: Mutex::new(config),
            logger: RwLock::new(logger),
            running: AtomicBool::new(false),
            reloads: AtomicUsize::new(0),
        })
    }
}

/// Second factory type, used to check typed lookups reject foreign instances.
#[derive(Default)]
pub(super) struct OtherFactory;

impl PluginFactory for OtherFactory {
    type Config = CounterConfig;
    type Plugin = CounterPlugin;

    fn plugin_type(&self) -> &str {
        "other"
    }

    fn version(&self) -> &str {
        "9.9.9"
    }

    fn default_config(&self) -> CounterConfig {
        CounterConfig::new("other", 2)
    }

    fn validate_config(&self, _config: &CounterConfig) -> std::result::Result<(), ConfigError> {
        Ok(())
    }

    fn create(&self, instance_id: &str, config: CounterConfig, logger: SharedLogger) -> Result<CounterPlugin> {
        CounterFactory::default().create(instance_id, config, logger)
    }
}

pub(super) fn counter_registry() -> crate::plugin_system::PluginRegistry {
    let registry = crate::plugin_system::PluginRegistry::new();
    registry.register_factory(Arc::new(CounterFactory::default()));
    registry
}
