//! # Bootkit Core Plugin System
//!
//! The multi-instance plugin model: factories build plugins from typed
//! configuration, the registry keeps both, and each created plugin is wrapped
//! in an instance that owns its configuration of record.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] and [`PluginFactory`] contracts, each with
//!   an associated `Config` type.
//! - **[`status`]**: [`PluginStatus`], [`StatusEvent`] and the
//!   [`StatusTracker`] plugins use to publish status changes.
//! - **[`instance`]**: [`PluginInstance`], with the transactional
//!   validate/apply/rollback configuration update, and its erased form
//!   [`AnyPluginInstance`].
//! - **[`factory`]**: [`AnyPluginFactory`], the erased factory the registry stores.
//! - **[`registry`]**: [`PluginRegistry`], factory and instance catalog.
//! - **[`entry`]**: [`InstanceEntry`], which lets the boot orchestrator drive
//!   a registered instance.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod entry;
pub mod error;
pub mod factory;
pub mod instance;
pub mod registry;
pub mod status;
pub mod traits;

pub use entry::{InstanceEntry, PLUGIN_INSTANCE_ENTRY_TYPE};
pub use error::{PluginSystemError, Result};
pub use factory::AnyPluginFactory;
pub use instance::{AnyPluginInstance, PluginInstance};
pub use registry::PluginRegistry;
pub use status::{PluginStatus, StatusEvent, StatusStream, StatusTracker};
pub use traits::{Plugin, PluginConfig, PluginFactory};

#[cfg(test)]
mod tests;
