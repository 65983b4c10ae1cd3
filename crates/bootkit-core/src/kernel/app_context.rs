use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio_util::sync::CancellationToken;

use crate::kernel::component::{Entry, EntryMap, RegFunc, ShutdownHook};
use crate::kernel::constants::{PLUGIN_ENTRY_TYPE, USER_ENTRY_TYPE};

/// The two classes of construction functions, and the pools of entries they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPool {
    /// Framework/plugin infrastructure. Bootstrapped first, interrupted last.
    Plugin,
    /// User components. Bootstrapped last, interrupted first.
    User,
}

impl EntryPool {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPool::Plugin => PLUGIN_ENTRY_TYPE,
            EntryPool::User => USER_ENTRY_TYPE,
        }
    }
}

impl fmt::Display for EntryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Catalog {
    /// entry type -> entry name -> entry
    entries: HashMap<String, EntryMap>,
    reg_funcs: HashMap<EntryPool, Vec<RegFunc>>,
    shutdown_hooks: HashMap<String, ShutdownHook>,
}

/// Application-wide state shared by the orchestrator and the process wiring.
///
/// Holds a non-owning catalog of entries by `(type, name)`, the registered
/// construction functions per [`EntryPool`], and the named shutdown hooks.
/// Every read returns a copy, so callers never hold the lock while they work
/// with the result.
pub struct AppContext {
    catalog: RwLock<Catalog>,
    shutdown: CancellationToken,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = self.read();
        let entry_count: usize = catalog.entries.values().map(|m| m.len()).sum();
        f.debug_struct("AppContext")
            .field("entries", &entry_count)
            .field("shutdown_hooks", &catalog.shutdown_hooks.len())
            .field("shutdown_requested", &self.shutdown.is_cancelled())
            .finish()
    }
}

static GLOBAL: OnceLock<Arc<AppContext>> = OnceLock::new();

impl AppContext {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Process-wide default context. Meant for the outermost wiring only;
    /// everything else takes an explicit `Arc<AppContext>`.
    pub fn global() -> Arc<AppContext> {
        GLOBAL.get_or_init(|| Arc::new(AppContext::new())).clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an entry under its own type and name, replacing any previous one.
    pub fn register_entry(&self, entry: Arc<dyn Entry>) {
        let entry_type = entry.entry_type().to_string();
        let name = entry.name().to_string();
        self.write()
            .entries
            .entry(entry_type)
            .or_default()
            .insert(name, entry);
    }

    pub fn get_entry(&self, entry_type: &str, name: &str) -> Option<Arc<dyn Entry>> {
        self.read()
            .entries
            .get(entry_type)
            .and_then(|by_name| by_name.get(name))
            .cloned()
    }

    pub fn list_entries_by_type(&self, entry_type: &str) -> EntryMap {
        self.read()
            .entries
            .get(entry_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every registered entry, keyed by type then name.
    pub fn list_entries(&self) -> HashMap<String, EntryMap> {
        self.read().entries.clone()
    }

    /// Remove an entry from the catalog. Does not interrupt it.
    pub fn remove_entry(&self, entry_type: &str, name: &str) -> Option<Arc<dyn Entry>> {
        self.write()
            .entries
            .get_mut(entry_type)
            .and_then(|by_name| by_name.remove(name))
    }

    pub fn register_reg_func(&self, pool: EntryPool, f: RegFunc) {
        self.write().reg_funcs.entry(pool).or_default().push(f);
    }

    pub fn register_plugin_entry_reg_func(&self, f: RegFunc) {
        self.register_reg_func(EntryPool::Plugin, f);
    }

    pub fn register_user_entry_reg_func(&self, f: RegFunc) {
        self.register_reg_func(EntryPool::User, f);
    }

    /// Construction functions of one class, in registration order.
    pub fn list_reg_funcs(&self, pool: EntryPool) -> Vec<RegFunc> {
        self.read().reg_funcs.get(&pool).cloned().unwrap_or_default()
    }

    pub fn list_plugin_entry_reg_funcs(&self) -> Vec<RegFunc> {
        self.list_reg_funcs(EntryPool::Plugin)
    }

    pub fn list_user_entry_reg_funcs(&self) -> Vec<RegFunc> {
        self.list_reg_funcs(EntryPool::User)
    }

    /// Add or replace a named shutdown hook.
    pub fn add_shutdown_hook(&self, name: impl Into<String>, hook: ShutdownHook) {
        self.write().shutdown_hooks.insert(name.into(), hook);
    }

    pub fn list_shutdown_hooks(&self) -> HashMap<String, ShutdownHook> {
        self.read().shutdown_hooks.clone()
    }

    /// Ask every `wait_for_shutdown_sig` caller to return, as if a signal arrived.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Block until SIGINT, SIGTERM (unix) or [`AppContext::request_shutdown`].
    ///
    /// If a signal handler cannot be installed that source is ignored and the
    /// remaining ones are still honoured.
    pub async fn wait_for_shutdown_sig(&self) {
        let interrupt = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Received SIGINT"),
                Err(e) => {
                    log::warn!("Failed to listen for SIGINT: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    log::info!("Received SIGTERM");
                }
                Err(e) => {
                    log::warn!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = interrupt => {}
            _ = terminate => {}
            _ = self.shutdown.cancelled() => log::info!("Shutdown requested"),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
