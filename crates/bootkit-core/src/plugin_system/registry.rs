use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::LevelFilter;
use serde_json::Value;

use crate::kernel::component::IntoAnyArc;
use crate::logging::{SharedLogger, StandardLogger};
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::factory::AnyPluginFactory;
use crate::plugin_system::instance::{AnyPluginInstance, PluginInstance};
use crate::plugin_system::traits::PluginFactory;

#[derive(Default)]
struct Catalog {
    /// plugin type -> factory
    factories: HashMap<String, Arc<dyn AnyPluginFactory>>,
    /// instance id -> instance
    instances: HashMap<String, Arc<dyn AnyPluginInstance>>,
}

/// Catalog of plugin factories and the instances created from them.
///
/// All mutations go through one coarse lock, and `create_instance` holds it
/// for its whole sequence so concurrent callers can never both claim an id.
/// Lookups hand out `Arc` clones or fresh maps, never views into the catalog.
pub struct PluginRegistry {
    catalog: RwLock<Catalog>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = self.read();
        f.debug_struct("PluginRegistry")
            .field("factories", &catalog.factories.keys().collect::<Vec<_>>())
            .field("instances", &catalog.instances.keys().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL: OnceLock<Arc<PluginRegistry>> = OnceLock::new();

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
        }
    }

    /// Process-wide default registry, for the outermost wiring only.
    pub fn global() -> Arc<PluginRegistry> {
        GLOBAL.get_or_init(|| Arc::new(PluginRegistry::new())).clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a factory under its plugin type, replacing any previous one.
    pub fn register_factory<F: PluginFactory>(&self, factory: Arc<F>) {
        let factory: Arc<dyn AnyPluginFactory> = factory;
        let plugin_type = factory.plugin_type().to_string();
        if self.write().factories.insert(plugin_type.clone(), factory).is_some() {
            log::debug!("Replaced plugin factory '{}'", plugin_type);
        }
    }

    pub fn get_factory(&self, plugin_type: &str) -> Option<Arc<dyn AnyPluginFactory>> {
        self.read().factories.get(plugin_type).cloned()
    }

    pub fn all_factories(&self) -> HashMap<String, Arc<dyn AnyPluginFactory>> {
        self.read().factories.clone()
    }

    pub fn count_factories(&self) -> usize {
        self.read().factories.len()
    }

    /// Create and register an instance.
    ///
    /// `config` defaults to the factory's default configuration and `logger`
    /// to a [`StandardLogger`] prefixed `"{plugin_type}-{instance_id}"`.
    /// On any failure the registry is left untouched.
    pub fn create_instance(
        &self,
        plugin_type: &str,
        instance_id: &str,
        config: Option<Value>,
        logger: Option<SharedLogger>,
    ) -> Result<Arc<dyn AnyPluginInstance>> {
        let mut catalog = self.write();

        if catalog.instances.contains_key(instance_id) {
            return Err(PluginSystemError::DuplicateInstance {
                instance_id: instance_id.to_string(),
            });
        }

        let factory = catalog
            .factories
            .get(plugin_type)
            .cloned()
            .ok_or_else(|| PluginSystemError::UnknownFactory {
                plugin_type: plugin_type.to_string(),
            })?;

        let invalid = |source| PluginSystemError::InvalidConfig {
            plugin_type: plugin_type.to_string(),
            source,
        };
        let config = match config {
            Some(config) => config,
            None => factory.default_config_value().map_err(invalid)?,
        };
        factory.validate_config_value(&config).map_err(invalid)?;

        let logger = logger.unwrap_or_else(|| {
            StandardLogger::shared(format!("{}-{}", plugin_type, instance_id), LevelFilter::Info)
        });

        let instance = factory.instantiate(instance_id, config, logger)?;
        catalog
            .instances
            .insert(instance_id.to_string(), instance.clone());
        log::debug!("Created plugin instance '{}' of type '{}'", instance_id, plugin_type);
        Ok(instance)
    }

    pub fn get_instance(&self, instance_id: &str) -> Option<Arc<dyn AnyPluginInstance>> {
        self.read().instances.get(instance_id).cloned()
    }

    /// Typed handle to an instance created by factory type `F`.
    /// `None` when the id is unknown or belongs to another factory type.
    pub fn get_instance_as<F: PluginFactory>(&self, instance_id: &str) -> Option<Arc<PluginInstance<F>>> {
        let instance = self.get_instance(instance_id)?;
        IntoAnyArc::into_any_arc(instance)
            .downcast::<PluginInstance<F>>()
            .ok()
    }

    pub fn instances_by_type(&self, plugin_type: &str) -> Vec<Arc<dyn AnyPluginInstance>> {
        self.read()
            .instances
            .values()
            .filter(|instance| instance.plugin_type() == plugin_type)
            .cloned()
            .collect()
    }

    pub fn all_instances(&self) -> Vec<Arc<dyn AnyPluginInstance>> {
        self.read().instances.values().cloned().collect()
    }

    pub fn count_instances(&self) -> usize {
        self.read().instances.len()
    }

    /// Drop an instance from the registry. The instance is not stopped;
    /// callers stop it first.
    pub fn remove_instance(&self, instance_id: &str) -> Result<Arc<dyn AnyPluginInstance>> {
        self.write()
            .instances
            .remove(instance_id)
            .ok_or_else(|| PluginSystemError::NotFound {
                instance_id: instance_id.to_string(),
            })
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
