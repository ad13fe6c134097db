// src/main.rs - Trading Server Entry Point
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::{env, sync::Arc};

use anyhow::{anyhow, Context, Result};
use config::{Config, ConfigError, Environment, File};
use tracing::{info, warn, Level};

use trading_engine::{transport::TcpServer, AppConfig, MatchingEngine};

// Global allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Configuration loading
fn load_config() -> Result<AppConfig, ConfigError> {
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let s = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/local")).required(false))
        .add_source(Environment::with_prefix("TRADING").separator("_"))
        .build()?;

    s.try_deserialize()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color_eyre for better error messages
    color_eyre::install().map_err(|err| anyhow!("Failed to install color_eyre: {err}"))?;

    // Load configuration
    let config = load_config().unwrap_or_else(|_| {
        warn!("Failed to load config, using defaults");
        AppConfig::default()
    });

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.logging.level.parse::<Level>().unwrap_or(Level::INFO))
        .with_target(false)
        .with_thread_ids(true);

    if config.logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.pretty().init();
    }

    info!("Starting trading server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {:?}", config);

    let engine = Arc::new(MatchingEngine::new());

    let server = TcpServer::bind(engine, &config.server)
        .await
        .context("Failed to start server")?;

    server.serve().await.context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
