use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bootkit_core::kernel::Scope;
use bootkit_core::logging::SharedLogger;
use bootkit_core::plugin_system::{
    Plugin, PluginStatus, PluginSystemError, Result, StatusStream, StatusTracker,
};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::consts::{DEFAULT_STOP_TIMEOUT, MIN_STOP_TIMEOUT, PLUGIN_NAME, PLUGIN_VERSION};
use crate::monitor::Monitor;

struct State {
    config: Config,
    monitor: Option<Monitor>,
}

/// Announcement monitor as a registry-managed plugin.
pub struct AnnouncementPlugin {
    id: String,
    state: Mutex<State>,
    tracker: StatusTracker,
    logger: RwLock<SharedLogger>,
}

impl AnnouncementPlugin {
    pub fn new(id: impl Into<String>, config: Config, logger: SharedLogger) -> Self {
        let id = id.into();
        Self {
            tracker: StatusTracker::new(id.clone()),
            id,
            state: Mutex::new(State {
                config,
                monitor: None,
            }),
            logger: RwLock::new(logger),
        }
    }

    /// Configuration the plugin is currently running with.
    pub async fn current_config(&self) -> Config {
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

    fn lifecycle_error(&self, operation: &str, message: impl ToString) -> PluginSystemError {
        PluginSystemError::lifecycle(&self.id, operation, message.to_string())
    }

    fn fail(&self, operation: &str, message: impl ToString) -> PluginSystemError {
        self.tracker
            .set(PluginStatus::Error, Some(self.lifecycle_error(operation, message.to_string())));
        self.lifecycle_error(operation, message)
    }
}

/// Time left in `scope`, or the default budget; never below the floor.
pub(crate) fn stop_budget(scope: &Scope) -> Duration {
    match scope.remaining() {
        None => DEFAULT_STOP_TIMEOUT,
        Some(left) if left.is_zero() => MIN_STOP_TIMEOUT,
        Some(left) => left,
    }
}

#[async_trait]
impl Plugin for AnnouncementPlugin {
    type Config = Config;

    fn id(&self) -> &str {
        &self.id
    }

    fn plugin_type(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    async fn start(&self, _scope: &Scope) -> Result<()> {
        let mut state = self.state.lock().await;
        let logger = self.logger();

        if !state.config.enabled {
            logger.info("Plugin is disabled, skipping start");
            return Ok(());
        }
        if state.monitor.is_some() {
            return Err(PluginSystemError::AlreadyRunning {
                plugin_id: self.id.clone(),
            });
        }

        let mut monitor = Monitor::new(state.config.clone(), logger.clone());
        if let Err(e) = monitor.start() {
            logger.error(format!("Failed to start monitor: {}", e));
            return Err(self.fail("start", format!("failed to start monitor: {}", e)));
        }
        state.monitor = Some(monitor);

        self.tracker.set(PluginStatus::Running, None);
        logger.info("Plugin started successfully");
        Ok(())
    }

    async fn stop(&self, scope: &Scope) -> Result<()> {
        let mut state = self.state.lock().await;
        let logger = self.logger();

        if let Some(mut monitor) = state.monitor.take() {
            if let Err(e) = monitor.stop_with_timeout(stop_budget(scope)).await {
                logger.error(format!("Failed to stop monitor: {}", e));
                return Err(self.fail("stop", format!("failed to stop monitor: {}", e)));
            }
        }

        self.tracker.set(PluginStatus::Stopped, None);
        logger.info("Plugin stopped");
        Ok(())
    }

    /// Stop the monitor, swap the configuration and restart when it was
    /// running. If the restart fails the previous configuration is restored
    /// and restarted, the status becomes `Error` and the failure is returned.
    async fn reload(&self, config: Config) -> Result<()> {
        let mut state = self.state.lock().await;
        let logger = self.logger();

        let was_running = state.monitor.is_some();
        if let Some(mut monitor) = state.monitor.take() {
            logger.info("Stopping monitor for config reload");
            monitor.stop().await;
        }

        let previous = std::mem::replace(&mut state.config, config);
        let previous_status = self.tracker.status();

        if was_running && state.config.enabled {
            logger.info("Restarting monitor with new configuration");
            let mut monitor = Monitor::new(state.config.clone(), logger.clone());
            if let Err(e) = monitor.start() {
                logger.error(format!("Failed to restart monitor: {}", e));

                state.config = previous;
                let mut restored = Monitor::new(state.config.clone(), logger.clone());
                match restored.start() {
                    Ok(()) => state.monitor = Some(restored),
                    Err(restore_err) => {
                        logger.error(format!("Failed to restore previous monitor: {}", restore_err))
                    }
                }
                return Err(self.fail("reload", format!("failed to restart monitor: {}", e)));
            }
            state.monitor = Some(monitor);
            self.tracker.set(PluginStatus::Running, None);
        } else if previous_status == PluginStatus::Running {
            self.tracker.set(PluginStatus::Stopped, None);
        }

        logger.info("Configuration reloaded successfully");
        Ok(())
    }

    fn status(&self) -> PluginStatus {
        self.tracker.status()
    }

    fn status_notify(&self) -> Option<StatusStream> {
        self.tracker.subscribe()
    }

    fn logger(&self) -> SharedLogger {
        self.logger
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_logger(&self, logger: SharedLogger) {
        *self.logger.write().unwrap_or_else(|e| e.into_inner()) = logger;
        if self.state.try_lock().map_or(true, |state| state.monitor.is_some()) {
            self.logger()
                .warn("Logger updated, but the running monitor keeps the old one until reload");
        }
    }
}
