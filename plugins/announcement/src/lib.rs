//! Announcement monitor: periodically checks configured sources.
//!
//! Usable two ways:
//! - as boot entries, one per item of the `announcement` section
//!   ([`entry::reg_func`]);
//! - as a registry plugin built by [`AnnouncementFactory`].
use std::sync::Arc;

use bootkit_core::kernel::AppContext;
use bootkit_core::plugin_system::PluginRegistry;

pub mod config;
pub mod consts;
pub mod entry;
pub mod error;
pub mod factory;
pub mod monitor;
pub mod plugin;

pub use config::{Config, Filters, Notification, Source};
pub use entry::{register_entries, AnnouncementEntry};
pub use error::MonitorError;
pub use factory::AnnouncementFactory;
pub use monitor::Monitor;
pub use plugin::AnnouncementPlugin;

/// Register the entry construction function (plugin pool) and the factory.
pub fn register(context: &AppContext, registry: &PluginRegistry) {
    context.register_plugin_entry_reg_func(entry::reg_func());
    registry.register_factory(Arc::new(AnnouncementFactory::new()));
}
