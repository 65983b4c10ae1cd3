use std::path::PathBuf;
use std::time::Duration;

use bootkit_core::kernel::constants::DEFAULT_CONFIG_PATH;
use bootkit_core::kernel::BootConfig;
use clap::{Parser, Subcommand};

/// Bootkit: boots the configured entries and shuts them down on a signal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Boot document (YAML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Budget in seconds for interrupting each entry pool (0 = default)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub shutdown_timeout: u64,

    /// Budget in seconds for interrupting a single entry (0 = default)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub entry_shutdown_timeout: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Bootstrap every entry and wait for SIGINT/SIGTERM (default)
    Run {
        /// Request shutdown on our own after this many seconds
        #[arg(long, value_name = "SECS")]
        run_for: Option<u64>,
    },
    /// Construct entries from the boot document and list them without starting anything
    Check,
    /// List registered plugin factories
    Factories,
}

impl CliArgs {
    pub fn boot_config(&self) -> BootConfig {
        BootConfig::default()
            .with_config_path(&self.config)
            .with_shutdown_timeout(Duration::from_secs(self.shutdown_timeout))
            .with_entry_shutdown_timeout(Duration::from_secs(self.entry_shutdown_timeout))
    }
}
