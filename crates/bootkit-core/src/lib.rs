pub mod config;
pub mod kernel;
pub mod logging;
pub mod plugin_system;

// Re-export key public types/traits for the binary and plugins
pub use kernel::error::Error as KernelError;
pub use kernel::{AppContext, Boot, BootConfig, Entry, EntryMap, EntryPool, RegFunc, Scope};
pub use logging::{Logger, SharedLogger, StandardLogger};
pub use plugin_system::{
    AnyPluginFactory, AnyPluginInstance, InstanceEntry, Plugin, PluginFactory, PluginInstance,
    PluginRegistry, PluginStatus, PluginSystemError, StatusEvent, StatusStream, StatusTracker,
};
