mod cli;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use bootkit_core::kernel::constants::{APP_NAME, APP_VERSION};
use bootkit_core::kernel::{AppContext, Boot, Result, Scope};
use bootkit_core::plugin_system::PluginRegistry;
use clap::Parser;
use log::{error, info};

use crate::cli::{CliArgs, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Explicit registration of every construction function and factory this
/// binary ships with.
fn register_plugins(context: &AppContext, registry: &PluginRegistry) {
    announcement::register(context, registry);
}

async fn run(args: CliArgs) -> Result<()> {
    let context = AppContext::global();
    let registry = PluginRegistry::global();
    register_plugins(&context, &registry);

    match args.command.clone().unwrap_or(Commands::Run { run_for: None }) {
        Commands::Factories => {
            list_factories(&registry);
            Ok(())
        }
        Commands::Check => {
            let boot = Boot::new(args.boot_config(), context)?;
            list_entries(&boot);
            Ok(())
        }
        Commands::Run { run_for } => {
            println!("{} v{}", APP_NAME, APP_VERSION);
            let boot = Boot::new(args.boot_config(), context.clone())?;
            info!("Loaded {} entries from {}", boot.count_entries(), boot.config_path().display());

            let scope = Scope::background();
            boot.bootstrap(&scope).await;
            info!("Bootstrap complete, waiting for shutdown signal");

            if let Some(secs) = run_for {
                let context = context.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    info!("Run time of {}s elapsed, requesting shutdown", secs);
                    context.request_shutdown();
                });
            }

            boot.wait_for_shutdown_sig(&scope).await;
            info!("Shutdown complete");
            Ok(())
        }
    }
}

fn list_factories(registry: &Arc<PluginRegistry>) {
    let mut factories: Vec<_> = registry.all_factories().into_values().collect();
    factories.sort_by(|a, b| a.plugin_type().cmp(b.plugin_type()));

    println!("Registered plugin factories:");
    for factory in factories {
        println!(
            "  - {} v{}: {}",
            factory.plugin_type(),
            factory.version(),
            factory.description()
        );
    }
}

fn list_entries(boot: &Boot) {
    let mut entries: Vec<_> = boot
        .all_entries()
        .into_values()
        .flat_map(|by_name| by_name.into_values())
        .collect();
    entries.sort_by(|a, b| (a.entry_type(), a.name()).cmp(&(b.entry_type(), b.name())));

    println!("Entries ({}):", entries.len());
    for entry in entries {
        println!("  - [{}] {}: {}", entry.entry_type(), entry.name(), entry.description());
    }
}
