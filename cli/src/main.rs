//! StarEvents CLI server
//!
//! ```sh
//! # Run with default config (~/.config/starevents/config.toml)
//! starevents
//!
//! # Custom config path
//! starevents --config /etc/starevents/config.toml
//!
//! # Override the listen port
//! starevents --port 5000
//!
//! # Validate config without starting
//! starevents --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use starevents::config::AppConfig;
use starevents::infrastructure::database::redact_url;
use starevents::server::{init_tracing, ServerHandle, ServerOptions};

/// StarEvents ticketing backend.
#[derive(Parser, Debug)]
#[command(
    name = "starevents",
    version,
    about = "StarEvents ticketing backend",
    long_about = "StarEvents HTTP server: cookie sign-in, promotions and \
                  first-run database seeding.\n\n\
                  Default config: ~/.config/starevents/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML); defaults to $STAREVENTS_CONFIG.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip seeding the admin account and promotions.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(starevents::default_config_path);
    let mut config = AppConfig::load(&config_path)?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        let database = config.connection_string()?;
        config.validate_security()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Environment : {:?}", config.environment);
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", redact_url(database));
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = ServerHandle::start(ServerOptions {
        config,
        run_seeder: !cli.no_seed,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
