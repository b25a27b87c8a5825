//! Asset Vault Server
//!
//! Serves sprite, audio and player-score storage over HTTP.

use anyhow::Context;
use asset_vault::core::config::{load_config_or_default, StorageType};
use asset_vault::core::factory::create_app_state;
use asset_vault::{api::start_api_server, Config, Error, Result};
use clap::{Arg, Command};
use tokio::signal;
use tracing::{info, warn};

// Configure global allocator for maximum performance
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("asset-vault")
        .version(asset_vault::VERSION)
        .about("Storage service for game sprites, audio clips and player scores.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("storage-type")
                .long("storage-type")
                .value_name("TYPE")
                .help("Storage backend type (memory, mongo)")
        )
        .arg(
            Arg::new("mongo-uri")
                .long("mongo-uri")
                .value_name("URI")
                .help("MongoDB connection string")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    // Load configuration: defaults, file, environment, then CLI
    let mut config = load_config_or_default(matches.get_one::<String>("config").map(String::as_str))
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &matches)?;
    config.validate().context("Invalid configuration")?;

    asset_vault::init(&config).context("Failed to initialize logging and metrics")?;
    info!("Starting Asset Vault v{}", asset_vault::VERSION);

    let app_state = create_app_state(config)
        .await
        .context("Failed to initialize storage")?;

    start_api_server(app_state, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(storage_type) = matches.get_one::<String>("storage-type") {
        config.storage.storage_type = storage_type.parse::<StorageType>()?;
    }

    if let Some(uri) = matches.get_one::<String>("mongo-uri") {
        config.storage.mongo.uri = uri.clone();
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
    warn!("Initiating graceful shutdown...");
}
