//! Generate command implementation
//!
//! This module implements the `generate` command, which runs one full feed
//! generation against the configured WooCommerce database.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_CONNECTION_ERROR, EXIT_FATAL_ERROR, EXIT_SUCCESS};
use crate::config::{load_config, load_mapping, FeedConfig};
use crate::core::generate::{FeedGenerator, GenerationSummary};
use crate::domain::FeedError;
use clap::Args;

/// Arguments for the generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Process at most N products (enables test-run mode)
    #[arg(long, value_name = "N")]
    pub limit: Option<u64>,

    /// Override the output file path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Override the mapping file path
    #[arg(short, long, value_name = "PATH")]
    pub mapping: Option<String>,

    /// Disable the pause between pages
    #[arg(long)]
    pub no_pause: bool,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting generate command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let mapping = match load_mapping(&config.feed.mapping_file) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load field mapping");
                eprintln!("Failed to load field mapping: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        tracing::info!(fields = mapping.len(), "Field mapping loaded");

        let generator = match FeedGenerator::new(&config, mapping).await {
            Ok(g) => g,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize feed generator");
                eprintln!("Failed to initialize feed generation: {e}");
                return Ok(exit_code_for_setup_error(&e));
            }
        };

        println!("🚀 Generating feed...");
        println!();

        let summary = generator.execute().await;
        print_summary(&summary);

        if summary.is_successful() {
            println!("✅ Feed generation completed!");
            Ok(EXIT_SUCCESS)
        } else {
            println!("❌ Feed generation aborted");
            Ok(EXIT_FATAL_ERROR)
        }
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut FeedConfig) {
        if let Some(limit) = self.limit {
            tracing::info!(limit, "Limiting run from CLI");
            config.test_run.enabled = true;
            config.test_run.product_limit = limit;
        }

        if let Some(output) = &self.output {
            tracing::info!(output = %output, "Overriding output file from CLI");
            config.feed.output_file = output.clone();
        }

        if let Some(mapping) = &self.mapping {
            tracing::info!(mapping = %mapping, "Overriding mapping file from CLI");
            config.feed.mapping_file = mapping.clone();
        }

        if self.no_pause {
            tracing::info!("Disabling server load reduction from CLI");
            config.server_load_reduction.enabled = false;
        }
    }
}

/// Exit code for an error raised before the run starts
pub fn exit_code_for_setup_error(error: &FeedError) -> i32 {
    match error {
        FeedError::Configuration(_) | FeedError::Mapping(_) => EXIT_CONFIG_ERROR,
        e if e.is_connection_error() => EXIT_CONNECTION_ERROR,
        _ => EXIT_FATAL_ERROR,
    }
}

fn print_summary(summary: &GenerationSummary) {
    println!();
    println!("📊 Generation Summary:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Total Products: {}", summary.total);
    println!("  Processed: {}", summary.processed);
    println!("  Written: {}", summary.written);
    println!("  Skipped: {}", summary.skipped);
    println!("  Pages: {}", summary.pages);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    if summary.output_created {
        println!("  Output: {}", summary.output_path.display());
    } else {
        println!("  Output: none (no products to write)");
    }
    if let Some(log_file) = &summary.log_file {
        println!("  Detail Log: {}", log_file.display());
    }
    println!();

    if !summary.skipped_records.is_empty() {
        println!("⚠️  Skipped products:");
        for error in &summary.skipped_records {
            println!("  - {} ({}): {}", error.product_id, error.stage, error.message);
        }
        let unlisted = summary.skipped - summary.skipped_records.len() as u64;
        if unlisted > 0 {
            println!("  ... and {unlisted} more");
        }
        println!();
    }

    if let Some(reason) = &summary.failure {
        println!("  Reason: {reason}");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::domain::StoreError;

    const CONFIG: &str = r#"
[store]
title = "SemiNest.in"
domain = "https://seminest.in"

[database]
connection_string = "mysql://wp:pw@localhost/wordpress"

[feed]
output_file = "feed.xml"

[server_load_reduction]
enabled = true

[regional]
country = "IN"
currency = "INR"

[regional.shipping]
service = "Standard"
price = 0

[regional.tax]
rate = 18
"#;

    #[test]
    fn test_overrides_applied() {
        let mut config = parse_config(CONFIG).unwrap();
        let args = GenerateArgs {
            limit: Some(5),
            output: Some("out.xml".to_string()),
            mapping: Some("custom.json".to_string()),
            no_pause: true,
        };

        args.apply_overrides(&mut config);
        assert_eq!(config.record_limit(), Some(5));
        assert_eq!(config.feed.output_file, "out.xml");
        assert_eq!(config.feed.mapping_file, "custom.json");
        assert!(config.page_pause().is_none());
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = parse_config(CONFIG).unwrap();
        GenerateArgs::default().apply_overrides(&mut config);
        assert_eq!(config.record_limit(), None);
        assert!(config.page_pause().is_some());
        assert_eq!(config.feed.output_file, "feed.xml");
    }

    #[test]
    fn test_setup_exit_codes() {
        assert_eq!(
            exit_code_for_setup_error(&FeedError::Configuration("bad".into())),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code_for_setup_error(&FeedError::Mapping("bad".into())),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code_for_setup_error(&StoreError::ConnectionFailed("refused".into()).into()),
            EXIT_CONNECTION_ERROR
        );
        assert_eq!(
            exit_code_for_setup_error(&StoreError::QueryFailed("syntax".into()).into()),
            EXIT_FATAL_ERROR
        );
    }
}
