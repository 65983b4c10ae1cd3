use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bootkit_core::logging::SharedLogger;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Filters, Source};
use crate::error::MonitorError;

/// Polls every configured source on its own interval until stopped.
///
/// One background task per source. Stopping cancels a shared token and waits
/// for the tasks; [`Monitor::stop_with_timeout`] gives up waiting after the
/// budget and leaves stragglers running.
pub struct Monitor {
    config: Config,
    logger: SharedLogger,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    checks: Arc<AtomicU64>,
    stopped: bool,
}

impl Monitor {
    pub fn new(config: Config, logger: SharedLogger) -> Self {
        Self {
            config,
            logger,
            token: CancellationToken::new(),
            tasks: Vec::new(),
            checks: Arc::new(AtomicU64::new(0)),
            stopped: false,
        }
    }

    /// Spawn one polling task per source. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if !self.config.enabled {
            return Err(MonitorError::Disabled);
        }
        if let Some(source) = self.config.sources.iter().find(|s| s.interval == 0) {
            return Err(MonitorError::ZeroInterval {
                source_name: source.name.clone(),
            });
        }

        self.logger
            .info(format!("Starting monitor for {} sources", self.config.sources.len()));
        for source in &self.config.sources {
            self.logger.debug(format!("Starting monitor for source: {}", source.name));
            self.tasks.push(tokio::spawn(poll_source(
                source.clone(),
                self.config.filters.clone(),
                self.logger.clone(),
                self.token.child_token(),
                self.checks.clone(),
            )));
        }
        Ok(())
    }

    /// True while at least one polling task is still alive.
    pub fn is_running(&self) -> bool {
        !self.stopped && self.tasks.iter().any(|task| !task.is_finished())
    }

    /// Number of source checks performed so far, across all sources.
    pub fn checks(&self) -> u64 {
        self.checks.load(Ordering::Relaxed)
    }

    /// Stop and wait for every polling task to exit.
    pub async fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.logger.info("Stopping monitor");
        self.token.cancel();
        for task in self.tasks.drain(..) {
            report_join(&self.logger, task.await);
        }
        self.stopped = true;
        self.logger.info("Monitor stopped, all tasks exited");
    }

    /// Stop, waiting at most `timeout` for the polling tasks.
    pub async fn stop_with_timeout(&mut self, timeout: Duration) -> Result<(), MonitorError> {
        if self.stopped {
            return Ok(());
        }
        self.logger
            .info(format!("Stopping monitor with timeout: {:?}", timeout));
        self.token.cancel();

        let tasks = std::mem::take(&mut self.tasks);
        let logger = self.logger.clone();
        let joined = tokio::time::timeout(timeout, async move {
            for task in tasks {
                report_join(&logger, task.await);
            }
        })
        .await;
        self.stopped = true;

        match joined {
            Ok(()) => {
                self.logger.info("Monitor stopped gracefully");
                Ok(())
            }
            Err(_) => {
                self.logger
                    .warn("Monitor stop timeout, some tasks may still be running");
                Err(MonitorError::StopTimeout(timeout))
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn poll_source(
    source: Source,
    filters: Filters,
    logger: SharedLogger,
    token: CancellationToken,
    checks: Arc<AtomicU64>,
) {
    let period = Duration::from_secs(source.interval);
    // First check one full period after start.
    let Some(first) = Instant::now().checked_add(period) else {
        logger.warn(format!(
            "Interval of source {} is too large to schedule, it will never be checked",
            source.name
        ));
        token.cancelled().await;
        return;
    };
    let mut ticker = tokio::time::interval_at(first, period);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                logger.debug(format!("Monitor task exiting for source: {}", source.name));
                return;
            }
            _ = ticker.tick() => {
                check_announcements(&source, &filters, &logger);
                checks.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

fn report_join(logger: &SharedLogger, joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            logger.error(format!("Monitor task panicked: {}", e));
        }
    }
}

fn check_announcements(source: &Source, filters: &Filters, logger: &SharedLogger) {
    logger.trace(format!(
        "Checking announcements from source: {}, URL: {} (keywords: {})",
        source.name,
        source.url,
        filters.keywords.join(",")
    ));
}
