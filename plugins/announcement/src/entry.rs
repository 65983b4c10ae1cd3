use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bootkit_core::config::NamedEntry;
use bootkit_core::kernel::{section_reg_func, Entry, EntryMap, RegFunc, Scope};
use bootkit_core::logging::{parse_level, SharedLogger, StandardLogger};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::consts::{entry_description, logger_prefix, ENTRY_TYPE_NAME, PLUGIN_NAME};
use crate::error::MonitorError;
use crate::monitor::Monitor;
use crate::plugin::stop_budget;

struct State {
    config: Config,
    monitor: Option<Monitor>,
}

/// Announcement monitor managed directly by the boot orchestrator.
pub struct AnnouncementEntry {
    name: String,
    description: String,
    /// Mirror of `config.enabled` readable without the state lock.
    enabled: AtomicBool,
    logger: SharedLogger,
    state: Mutex<State>,
}

impl AnnouncementEntry {
    pub fn new(name: impl Into<String>, config: Config, logger: SharedLogger) -> Self {
        let name = name.into();
        Self {
            description: entry_description(&name),
            enabled: AtomicBool::new(config.enabled),
            name,
            logger,
            state: Mutex::new(State {
                config,
                monitor: None,
            }),
        }
    }

    /// Build from a resolved section item, with a logger named after the
    /// instance at the item's `logLevel`.
    pub fn from_named(named: NamedEntry<Config>) -> Self {
        let mut config = named.config;
        config.name = named.name.clone();
        let logger = StandardLogger::shared(logger_prefix(&named.name), parse_level(&config.log_level));
        Self::new(named.name, config, logger)
    }

    pub async fn config(&self) -> Config {
        self.state.lock().await.config.clone()
    }

    pub async fn is_monitoring(&self) -> bool {
        self.state
            .lock()
            .await
            .monitor
            .as_ref()
            .is_some_and(Monitor::is_running)
    }

    /// Swap the configuration, restarting the monitor if it was running.
    pub async fn reload(&self, config: Config) -> Result<(), MonitorError> {
        let mut state = self.state.lock().await;

        let was_running = state.monitor.is_some();
        if let Some(mut monitor) = state.monitor.take() {
            monitor.stop().await;
        }
        state.config = config;
        self.enabled.store(state.config.enabled, Ordering::Relaxed);

        if was_running && state.config.enabled {
            let mut monitor = Monitor::new(state.config.clone(), self.logger.clone());
            monitor.start()?;
            state.monitor = Some(monitor);
        }

        self.logger
            .info(format!("[{}] Configuration reloaded", self.name));
        Ok(())
    }
}

impl fmt::Display for AnnouncementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnnouncementEntry{{name={}, enabled={}}}",
            self.name,
            self.enabled.load(Ordering::Relaxed)
        )
    }
}

#[async_trait]
impl Entry for AnnouncementEntry {
    async fn bootstrap(&self, _scope: &Scope) {
        let mut state = self.state.lock().await;

        if !state.config.enabled {
            self.logger
                .info(format!("[{}] Entry is disabled, skipping bootstrap", self.name));
            return;
        }
        self.logger
            .info(format!("[{}] Bootstrapping announcement entry...", self.name));

        let mut monitor = Monitor::new(state.config.clone(), self.logger.clone());
        if let Err(e) = monitor.start() {
            self.logger
                .error(format!("[{}] Failed to start monitor: {}", self.name, e));
            return;
        }
        state.monitor = Some(monitor);

        self.logger
            .info(format!("[{}] Announcement entry bootstrapped successfully", self.name));
    }

    async fn interrupt(&self, scope: &Scope) {
        let mut state = self.state.lock().await;
        self.logger
            .info(format!("[{}] Interrupting announcement entry...", self.name));

        if let Some(mut monitor) = state.monitor.take() {
            if let Err(e) = monitor.stop_with_timeout(stop_budget(scope)).await {
                self.logger
                    .error(format!("[{}] Failed to stop monitor: {}", self.name, e));
            }
        }

        self.logger
            .info(format!("[{}] Announcement entry interrupted", self.name));
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> &str {
        ENTRY_TYPE_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Construction function for the `announcement` section: one entry per item.
pub fn reg_func() -> RegFunc {
    section_reg_func::<Config, _>(PLUGIN_NAME, |named| {
        Arc::new(AnnouncementEntry::from_named(named)) as Arc<dyn Entry>
    })
}

/// Build all announcement entries described in `raw`.
pub fn register_entries(raw: &[u8]) -> EntryMap {
    reg_func()(raw)
}
