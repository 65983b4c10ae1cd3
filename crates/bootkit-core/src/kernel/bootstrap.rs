use std::any::Any;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use log::LevelFilter;

use crate::config::ConfigError;
use crate::kernel::app_context::{AppContext, EntryPool};
use crate::kernel::component::{Entry, EntryMap, HookFn, ShutdownHook};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::scope::Scope;
use crate::logging::{SharedLogger, StandardLogger};

/// Options for constructing a [`Boot`].
#[derive(Clone)]
pub struct BootConfig {
    /// Boot document path, resolved against the working directory when relative.
    pub config_path: PathBuf,
    /// Raw boot document. Takes precedence over `config_path` when non-empty.
    pub config_raw: Option<Vec<u8>>,
    /// Budget for interrupting each pool. Zero means the default.
    pub shutdown_timeout: Duration,
    /// Budget for interrupting a single entry. Zero means the default.
    pub entry_shutdown_timeout: Duration,
    /// Orchestrator logger; defaults to a `StandardLogger` prefixed `boot`.
    pub logger: Option<SharedLogger>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(constants::DEFAULT_CONFIG_PATH),
            config_raw: None,
            shutdown_timeout: constants::DEFAULT_SHUTDOWN_TIMEOUT,
            entry_shutdown_timeout: constants::DEFAULT_ENTRY_SHUTDOWN_TIMEOUT,
            logger: None,
        }
    }
}

impl BootConfig {
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_config_raw(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.config_raw = Some(raw.into());
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_entry_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.entry_shutdown_timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// entry type -> entry name -> hook
#[derive(Default)]
struct HookMap(HashMap<String, HashMap<String, HookFn>>);

impl HookMap {
    fn add(&mut self, entry_type: &str, name: &str, hook: HookFn) {
        self.0
            .entry(entry_type.to_string())
            .or_default()
            .insert(name.to_string(), hook);
    }

    fn run(&self, entry_type: &str, name: &str, scope: &Scope) {
        if let Some(hook) = self.0.get(entry_type).and_then(|by_name| by_name.get(name)) {
            hook(scope);
        }
    }
}

/// entry type -> entry name -> entry
type EntryPools = HashMap<String, EntryMap>;

/// Boot orchestrator.
///
/// Reads the boot document once, runs every registered construction function
/// against it, and owns the bootstrap/interrupt protocol for the resulting
/// entries.
///
/// - Bootstrap runs the plugin pool, then the user pool, one entry at a time,
///   with optional before/after hooks around each entry.
/// - Shutdown runs the shutdown hooks, then interrupts the user pool and then
///   the plugin pool. Entries of a pool are interrupted concurrently, each
///   under its own deadline, and the pool as a whole under the aggregate
///   deadline. Entries that miss their deadline are abandoned, not killed.
/// - A panic in either sequence is fatal.
pub struct Boot {
    config_path: PathBuf,
    before_hooks: HookMap,
    after_hooks: HookMap,
    plugin_entries: EntryPools,
    user_entries: EntryPools,
    context: Arc<AppContext>,
    logger: SharedLogger,
    shutdown_timeout: Duration,
    entry_shutdown_timeout: Duration,
}

impl Boot {
    /// Read the boot document and construct all entries.
    ///
    /// Every construction function registered in `context` is called exactly
    /// once. Produced entries are also registered in `context`.
    pub fn new(config: BootConfig, context: Arc<AppContext>) -> Result<Self> {
        let logger = config.logger.clone().unwrap_or_else(|| {
            StandardLogger::shared(constants::BOOT_LOGGER_PREFIX, LevelFilter::Info)
        });
        let config_path = resolve_path(&config.config_path);
        let raw = read_boot_document(config.config_raw.as_deref(), &config_path)?;

        let mut boot = Boot {
            config_path,
            before_hooks: HookMap::default(),
            after_hooks: HookMap::default(),
            plugin_entries: EntryPools::new(),
            user_entries: EntryPools::new(),
            context,
            logger,
            shutdown_timeout: non_zero_or(config.shutdown_timeout, constants::DEFAULT_SHUTDOWN_TIMEOUT),
            entry_shutdown_timeout: non_zero_or(
                config.entry_shutdown_timeout,
                constants::DEFAULT_ENTRY_SHUTDOWN_TIMEOUT,
            ),
        };

        for pool in [EntryPool::Plugin, EntryPool::User] {
            for reg_func in boot.context.list_reg_funcs(pool) {
                for (name, entry) in reg_func(raw.as_slice()) {
                    let entry_type = entry.entry_type().to_string();
                    boot.logger.debug(format!("Registered [{}] {} ({})", entry_type, name, pool));
                    boot.context.register_entry(entry.clone());
                    boot.pool_mut(pool)
                        .entry(entry_type)
                        .or_default()
                        .insert(name, entry);
                }
            }
        }

        Ok(boot)
    }

    fn pool(&self, pool: EntryPool) -> &EntryPools {
        match pool {
            EntryPool::Plugin => &self.plugin_entries,
            EntryPool::User => &self.user_entries,
        }
    }

    fn pool_mut(&mut self, pool: EntryPool) -> &mut EntryPools {
        match pool {
            EntryPool::Plugin => &mut self.plugin_entries,
            EntryPool::User => &mut self.user_entries,
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    /// Absolute path the boot document was (or would have been) read from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    pub fn entry_shutdown_timeout(&self) -> Duration {
        self.entry_shutdown_timeout
    }

    /// Run `hook` right before the bootstrap of entry `(entry_type, name)`.
    pub fn add_hook_before_bootstrap<F>(&mut self, entry_type: &str, name: &str, hook: F)
    where
        F: Fn(&Scope) + Send + Sync + 'static,
    {
        self.before_hooks.add(entry_type, name, Arc::new(hook));
    }

    /// Run `hook` right after the bootstrap of entry `(entry_type, name)`.
    pub fn add_hook_after_bootstrap<F>(&mut self, entry_type: &str, name: &str, hook: F)
    where
        F: Fn(&Scope) + Send + Sync + 'static,
    {
        self.after_hooks.add(entry_type, name, Arc::new(hook));
    }

    pub fn add_shutdown_hook<F>(&self, name: impl Into<String>, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let hook: ShutdownHook = Arc::new(hook);
        self.context.add_shutdown_hook(name, hook);
    }

    /// Bootstrap every entry; a panic terminates the process.
    pub async fn bootstrap(&self, scope: &Scope) {
        if let Err(e) = self.try_bootstrap(scope).await {
            self.fatal(e);
        }
    }

    /// Bootstrap every entry, reporting a panic as [`Error::Panicked`].
    pub async fn try_bootstrap(&self, scope: &Scope) -> Result<()> {
        let sequence = async {
            for pool in [EntryPool::Plugin, EntryPool::User] {
                self.bootstrap_pool(pool, scope).await;
            }
        };
        AssertUnwindSafe(sequence)
            .catch_unwind()
            .await
            .map_err(|payload| self.report_panic(KernelLifecyclePhase::Bootstrap, payload))
    }

    async fn bootstrap_pool(&self, pool: EntryPool, scope: &Scope) {
        for (entry_type, by_name) in self.pool(pool) {
            for (name, entry) in by_name {
                self.before_hooks.run(entry_type, name, scope);
                self.logger.info(format!("Bootstrapping [{}] {}", entry_type, name));
                entry.bootstrap(scope).await;
                self.after_hooks.run(entry_type, name, scope);
            }
        }
    }

    /// Block until a shutdown signal arrives, then shut down.
    pub async fn wait_for_shutdown_sig(&self, scope: &Scope) {
        self.context.wait_for_shutdown_sig().await;
        self.shutdown(scope).await;
    }

    /// Run shutdown hooks and interrupt every entry; a panic terminates the process.
    pub async fn shutdown(&self, scope: &Scope) {
        if let Err(e) = self.try_shutdown(scope).await {
            self.fatal(e);
        }
    }

    /// Run shutdown hooks and interrupt every entry, reporting a panic as
    /// [`Error::Panicked`]. Returns once every entry finished or the
    /// aggregate deadline passed.
    pub async fn try_shutdown(&self, scope: &Scope) -> Result<()> {
        let shutdown_root = scope.child();

        let sequence = async {
            let shutdown_scope = shutdown_root.with_timeout(self.shutdown_timeout);
            for (name, hook) in self.context.list_shutdown_hooks() {
                self.logger.info(format!("Running shutdown hook: {}", name));
                hook();
            }

            // User entries depend on plugin infrastructure, so they go first.
            for pool in [EntryPool::User, EntryPool::Plugin] {
                self.interrupt_pool(pool, &shutdown_scope).await;
            }
        };

        let outcome = AssertUnwindSafe(sequence).catch_unwind().await;
        // Signal anything still running that the budget is gone.
        shutdown_root.cancel();
        outcome.map_err(|payload| self.report_panic(KernelLifecyclePhase::Shutdown, payload))
    }

    async fn interrupt_pool(&self, pool: EntryPool, scope: &Scope) {
        let label = match pool {
            EntryPool::Plugin => "plugin entries",
            EntryPool::User => "user entries",
        };

        let mut handles = Vec::new();
        for (entry_type, by_name) in self.pool(pool) {
            for (name, entry) in by_name {
                let entry_scope = scope.with_timeout(self.entry_shutdown_timeout);
                handles.push(tokio::spawn(interrupt_single(
                    self.logger.clone(),
                    entry_type.clone(),
                    name.clone(),
                    entry.clone(),
                    entry_scope,
                )));
            }
        }

        // Dropping the remaining handles on timeout detaches those tasks.
        let all_done = async {
            for joined in futures::future::join_all(handles).await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        std::panic::resume_unwind(e.into_panic());
                    }
                }
            }
        };

        tokio::select! {
            biased;
            _ = all_done => self.logger.info(format!("All {} interrupted successfully", label)),
            _ = scope.done() => self.logger.warn(format!(
                "Shutdown timeout exceeded for {}, abandoning remaining interrupts",
                label
            )),
        }
    }

    fn report_panic(&self, phase: KernelLifecyclePhase, payload: Box<dyn Any + Send>) -> Error {
        let message = panic_message(payload.as_ref());
        self.logger.error(format!(
            "Panic occurred during {}, shutting down...\n{}",
            phase,
            Backtrace::force_capture()
        ));
        self.logger.error(format!("Root cause: {}", message));
        Error::Panicked { phase, message }
    }

    fn fatal(&self, err: Error) -> ! {
        self.logger.error(format!("Fatal: {}", err));
        std::process::exit(1)
    }

    /// Look up an entry in either pool, plugin pool first.
    pub fn get_entry(&self, entry_type: &str, name: &str) -> Option<Arc<dyn Entry>> {
        [EntryPool::Plugin, EntryPool::User]
            .into_iter()
            .find_map(|pool| self.pool(pool).get(entry_type)?.get(name).cloned())
    }

    /// All entries of one type across both pools.
    pub fn entries_by_type(&self, entry_type: &str) -> EntryMap {
        let mut result = EntryMap::new();
        for pool in [EntryPool::Plugin, EntryPool::User] {
            if let Some(by_name) = self.pool(pool).get(entry_type) {
                result.extend(by_name.iter().map(|(n, e)| (n.clone(), e.clone())));
            }
        }
        result
    }

    /// Snapshot of both pools merged, keyed by type then name.
    pub fn all_entries(&self) -> HashMap<String, EntryMap> {
        let mut result: HashMap<String, EntryMap> = HashMap::new();
        for pool in [EntryPool::Plugin, EntryPool::User] {
            for (entry_type, by_name) in self.pool(pool) {
                result
                    .entry(entry_type.clone())
                    .or_default()
                    .extend(by_name.iter().map(|(n, e)| (n.clone(), e.clone())));
            }
        }
        result
    }

    pub fn count_entries(&self) -> usize {
        [EntryPool::Plugin, EntryPool::User]
            .into_iter()
            .flat_map(|pool| self.pool(pool).values())
            .map(|by_name| by_name.len())
            .sum()
    }
}

async fn interrupt_single(
    logger: SharedLogger,
    entry_type: String,
    name: String,
    entry: Arc<dyn Entry>,
    scope: Scope,
) {
    logger.info(format!("Interrupting [{}] {}", entry_type, name));

    let call_scope = scope.clone();
    let mut handle = tokio::spawn(async move { entry.interrupt(&call_scope).await });

    tokio::select! {
        biased;
        joined = &mut handle => match joined {
            Ok(()) => logger.info(format!("Interrupted [{}] {}", entry_type, name)),
            Err(e) if e.is_panic() => {
                scope.cancel();
                std::panic::resume_unwind(e.into_panic());
            }
            Err(e) => logger.warn(format!("Interrupt of [{}] {} did not finish: {}", entry_type, name, e)),
        },
        _ = scope.done() => logger.warn(format!("Interrupt timeout [{}] {}", entry_type, name)),
    }
    scope.cancel();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn read_boot_document(raw: Option<&[u8]>, path: &Path) -> std::result::Result<Vec<u8>, ConfigError> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(raw.to_vec()),
        _ => std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
