// NovaZen Feed - Google Shopping feed generator for WooCommerce
// Copyright (c) 2025 NovaZen Contributors
// Licensed under the MIT License

use clap::Parser;
use novazen_feed::cli::{Cli, Commands, EXIT_FATAL_ERROR};
use novazen_feed::config::{load_config, LoggingConfig};
use novazen_feed::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it can be loaded; commands
    // report configuration errors themselves.
    let (configured_level, logging_config) = match load_config(&cli.config) {
        Ok(config) if matches!(cli.command, Commands::Generate(_)) => {
            (config.application.log_level, config.logging)
        }
        Ok(config) => (config.application.log_level, LoggingConfig::console_only()),
        Err(_) => ("info".to_string(), LoggingConfig::console_only()),
    };
    let log_level = cli.log_level.clone().unwrap_or(configured_level);

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL_ERROR);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "NovaZen - Google Shopping feed generator"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL_ERROR
        }
    };

    // process::exit skips destructors, so flush the file writer first
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Generate(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
