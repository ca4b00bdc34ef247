//! Courtbook CLI: booking, catalog, and maintenance commands.

mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use courtbook_core::config::{AppConfig, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = AppConfig::load(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging);

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,courtbook={}", config.level)));

    if config.format == LogFormat::Json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
