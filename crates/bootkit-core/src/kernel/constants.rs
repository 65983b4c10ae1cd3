use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "bootkit";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boot document looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "boot.yaml";

/// Budget for interrupting all entries of a pool
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for interrupting a single entry
pub const DEFAULT_ENTRY_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Prefix of the orchestrator's own logger
pub const BOOT_LOGGER_PREFIX: &str = "boot";

/// Pool holding entries from plugin construction functions
pub const PLUGIN_ENTRY_TYPE: &str = "PluginEntry";

/// Pool holding entries from user construction functions
pub const USER_ENTRY_TYPE: &str = "UserEntry";

/// Capacity of a plugin's status notification channel
pub const STATUS_CHANNEL_CAPACITY: usize = 10;
