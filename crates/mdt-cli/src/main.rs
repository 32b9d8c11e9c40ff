//! MDT CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mdt_cli::cli::Cli;
use mdt_cli::commands;

#[tokio::main]
async fn main() {
    // API keys: ./.env.local first, then the user config directory
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_path(mdt_registry::config::env_file());

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry_path = cli.registry_path();
    if let Err(e) = commands::execute(cli.command, &registry_path).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
