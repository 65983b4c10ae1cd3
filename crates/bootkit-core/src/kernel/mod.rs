//! # Bootkit Core Kernel
//!
//! The lifecycle runtime: the [`Entry`] contract, the shared [`AppContext`]
//! catalog and the [`Boot`] orchestrator that walks both entry pools.
//!
//! ## Key Components:
//!
//! - **[`Scope`]**: cancellation token plus optional deadline, passed into
//!   every lifecycle call.
//! - **[`Entry`]**: the bootstrap/interrupt contract, together with the
//!   construction function type [`RegFunc`] and hook types.
//! - **[`AppContext`]**: catalog of entries, construction functions and
//!   shutdown hooks; also owns the shutdown-signal wait.
//! - **[`Boot`]**: reads the boot document, builds entries, bootstraps them in
//!   order and interrupts them in reverse order under time budgets.
//! - **Error Handling**: kernel [`Error`] and [`Result`] in the `error` submodule.
pub mod app_context;
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;
pub mod scope;

pub use app_context::{AppContext, EntryPool};
pub use bootstrap::{Boot, BootConfig};
pub use component::{downcast_entry, Entry, EntryMap, HookFn, IntoAnyArc, RegFunc, ShutdownHook};
#[cfg(feature = "yaml-config")]
pub use component::section_reg_func;
pub use error::{Error, KernelLifecyclePhase, Result};
pub use scope::Scope;

#[cfg(test)]
mod tests;
