//! Core business logic for the feed generator.
//!
//! # Modules
//!
//! - [`assemble`] - Builds the flat per-product record from store lookups
//! - [`feed`] - Feed document serialization and regional blocks
//! - [`generate`] - Run orchestration, paging and summary
//! - [`transform`] - Text sanitization and mapping resolution
//!
//! # Generation Workflow
//!
//! 1. **Count**: Determine how many eligible products will be processed
//! 2. **Page**: Fetch products in ascending id order, one page at a time
//! 3. **Assemble**: Look up meta attributes, images and category per product
//! 4. **Render**: Resolve every mapped field and serialize the item
//! 5. **Write**: Stream items to the output file between header and footer
//! 6. **Report**: Produce the generation summary
//!
//! # Example
//!
//! ```rust,no_run
//! use novazen_feed::config::{load_config, load_mapping};
//! use novazen_feed::core::generate::FeedGenerator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("feed.toml")?;
//! let mapping = load_mapping(&config.feed.mapping_file)?;
//!
//! let generator = FeedGenerator::new(&config, mapping).await?;
//! let summary = generator.execute().await;
//!
//! println!("Written: {}", summary.written);
//! println!("Skipped: {}", summary.skipped);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod feed;
pub mod generate;
pub mod transform;
