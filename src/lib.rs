// NovaZen Feed - Google Shopping feed generator for WooCommerce
// Copyright (c) 2025 NovaZen Contributors
// Licensed under the MIT License

//! # NovaZen Feed - Google Shopping feed generator
//!
//! Reads the product catalog of a WooCommerce store straight from its MySQL
//! database and writes a Google Shopping (RSS 2.0 + `g:` namespace) product
//! feed. Which fields appear in the feed, and where their values come from,
//! is decided by a JSON field mapping rather than by code.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (assembly, resolution, serialization, orchestration)
//! - [`adapters`] - Product stores (MySQL, in-memory)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration and mapping file loading
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use novazen_feed::config::{load_config, load_mapping};
//! use novazen_feed::core::generate::FeedGenerator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("feed.toml")?;
//!     let mapping = load_mapping(&config.feed.mapping_file)?;
//!
//!     let generator = FeedGenerator::new(&config, mapping).await?;
//!     let summary = generator.execute().await;
//!
//!     println!("Wrote {} products", summary.written);
//!     Ok(())
//! }
//! ```
//!
//! ## Field Mapping
//!
//! Each entry of the mapping file names an output field, its value source
//! and the element it is written as:
//!
//! ```rust
//! use novazen_feed::domain::FieldMappingSpec;
//!
//! let mapping = FieldMappingSpec::from_json_str(r#"{
//!     "id": {"source": "ID", "xml_tag": "g:id"},
//!     "price": {"source": "_price", "xml_tag": "g:price", "suffix": " INR"}
//! }"#).unwrap();
//!
//! assert_eq!(mapping.len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! Fatal errors use [`domain::FeedError`]. Failures of a single product are
//! reported as [`domain::RecordError`]; the product is skipped and the run
//! continues.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
