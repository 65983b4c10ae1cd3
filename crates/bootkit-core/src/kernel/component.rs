use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(feature = "yaml-config")]
use serde::de::DeserializeOwned;

#[cfg(feature = "yaml-config")]
use crate::config::{self, NamedEntry};
use crate::kernel::scope::Scope;

/// Conversion of a shared trait object back into `Arc<dyn Any>` for downcasting.
/// Implemented for every sized `Send + Sync + 'static` type.
pub trait IntoAnyArc: Any + Send + Sync {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> IntoAnyArc for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Lifecycle contract for every bootable unit ("entry").
///
/// The orchestrator calls `bootstrap` at most once and `interrupt` once during
/// shutdown. `interrupt` may arrive without a prior `bootstrap` (disabled or
/// never-started entries) and must then be a no-op. The scope passed to
/// `interrupt` carries the time budget the entry should honour.
#[async_trait]
pub trait Entry: IntoAnyArc + fmt::Display {
    /// Perform all startup work, spawning background tasks as needed.
    async fn bootstrap(&self, scope: &Scope);

    /// Release everything `bootstrap` started.
    async fn interrupt(&self, scope: &Scope);

    /// Instance name, unique within its type.
    fn name(&self) -> &str;

    /// Entry type, e.g. `"AnnouncementEntry"`.
    fn entry_type(&self) -> &str;

    fn description(&self) -> &str;
}

/// Named entries produced by one construction function.
pub type EntryMap = HashMap<String, Arc<dyn Entry>>;

/// Construction function: raw boot document in, named entries out.
/// Must return an empty map (never panic) when its section is absent or malformed.
pub type RegFunc = Arc<dyn Fn(&[u8]) -> EntryMap + Send + Sync>;

/// Zero-argument callable run synchronously at the start of shutdown.
pub type ShutdownHook = Arc<dyn Fn() + Send + Sync>;

/// Callable run immediately before or after a specific entry's bootstrap.
pub type HookFn = Arc<dyn Fn(&Scope) + Send + Sync>;

/// Recover the concrete type behind an `Arc<dyn Entry>`.
pub fn downcast_entry<T: Entry>(entry: Arc<dyn Entry>) -> Option<Arc<T>> {
    IntoAnyArc::into_any_arc(entry).downcast::<T>().ok()
}

/// Build a construction function for a multi-instance YAML section.
///
/// `build` is called once per resolved instance (see
/// [`config::section_entries`]). Parse failures are logged and produce an
/// empty map so one bad section cannot take down the whole boot.
#[cfg(feature = "yaml-config")]
pub fn section_reg_func<T, F>(section: impl Into<String>, build: F) -> RegFunc
where
    T: DeserializeOwned + 'static,
    F: Fn(NamedEntry<T>) -> Arc<dyn Entry> + Send + Sync + 'static,
{
    let section = section.into();
    Arc::new(move |raw: &[u8]| {
        let mut result = EntryMap::new();
        match config::section_entries::<T>(raw, &section) {
            Ok(entries) => {
                for named in entries {
                    let name = named.name.clone();
                    result.insert(name, build(named));
                }
            }
            Err(e) => log::error!("Config parse error in section '{}': {}", section, e),
        }
        result
    })
}
