use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `log` records from the core and plugins are
/// bridged into it. RUST_LOG wins over `default_level`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
