use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::component::Entry;
use crate::kernel::scope::Scope;
use crate::plugin_system::instance::AnyPluginInstance;

/// Entry type used for instances exposed through [`InstanceEntry`].
pub const PLUGIN_INSTANCE_ENTRY_TYPE: &str = "PluginInstanceEntry";

/// Exposes a registered plugin instance to the boot orchestrator.
///
/// Bootstrap starts the plugin and interrupt stops it with the interrupt
/// scope. Failures are logged through the plugin's logger; the orchestrator
/// has no error channel for entries.
pub struct InstanceEntry {
    instance: Arc<dyn AnyPluginInstance>,
    description: String,
}

impl InstanceEntry {
    pub fn new(instance: Arc<dyn AnyPluginInstance>) -> Self {
        let description = format!("{} plugin instance {}", instance.plugin_type(), instance.id());
        Self {
            instance,
            description,
        }
    }

    pub fn instance(&self) -> &Arc<dyn AnyPluginInstance> {
        &self.instance
    }
}

impl fmt::Display for InstanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"entryName\":\"{}\",\"entryType\":\"{}\",\"pluginType\":\"{}\",\"status\":\"{}\"}}",
            self.instance.id(),
            PLUGIN_INSTANCE_ENTRY_TYPE,
            self.instance.plugin_type(),
            self.instance.status()
        )
    }
}

#[async_trait]
impl Entry for InstanceEntry {
    async fn bootstrap(&self, scope: &Scope) {
        if let Err(e) = self.instance.start(scope).await {
            self.instance
                .logger()
                .error(format!("Failed to start plugin instance {}: {}", self.instance.id(), e));
        }
    }

    async fn interrupt(&self, scope: &Scope) {
        if let Err(e) = self.instance.stop(scope).await {
            self.instance
                .logger()
                .error(format!("Failed to stop plugin instance {}: {}", self.instance.id(), e));
        }
    }

    fn name(&self) -> &str {
        self.instance.id()
    }

    fn entry_type(&self) -> &str {
        PLUGIN_INSTANCE_ENTRY_TYPE
    }

    fn description(&self) -> &str {
        &self.description
    }
}
