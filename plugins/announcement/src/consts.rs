/// Plugin type name, also the section key in the boot document
pub const PLUGIN_NAME: &str = "announcement";

pub const PLUGIN_VERSION: &str = "1.0.0";

/// Entry type of boot-managed instances
pub const ENTRY_TYPE_NAME: &str = "AnnouncementEntry";

/// Host-side override of the default config, relative to the working directory
pub const HOST_CONFIG_PATH: &str = "plugins/announcement/config.yaml";

/// Budget for stopping the monitor when the caller gives no deadline
pub const DEFAULT_STOP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Floor applied when the caller's deadline has already passed
pub const MIN_STOP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

pub fn entry_description(name: &str) -> String {
    format!("Announcement monitor entry [{}]", name)
}

pub fn logger_prefix(name: &str) -> String {
    format!("{}-{}", PLUGIN_NAME, name)
}
