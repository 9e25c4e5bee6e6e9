//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code of a completed run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for configuration and mapping errors
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code when the store cannot be reached
pub const EXIT_CONNECTION_ERROR: i32 = 4;
/// Exit code for fatal run errors
pub const EXIT_FATAL_ERROR: i32 = 5;

/// NovaZen - Google Shopping feed generator for WooCommerce
#[derive(Parser, Debug)]
#[command(name = "novazen-feed")]
#[command(version, about, long_about = None)]
#[command(author = "NovaZen Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "feed.toml", env = "NOVAZEN_CONFIG", global = true)]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "NOVAZEN_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the product feed
    Generate(commands::generate::GenerateArgs),

    /// Validate configuration and mapping files
    ValidateConfig(commands::validate::ValidateArgs),

    /// Write a sample configuration and mapping file
    Init(commands::init::InitArgs),
}
