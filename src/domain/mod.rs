//! Domain models and types for the feed generator.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Product records** ([`RawProductRecord`], [`MetaAttributes`], [`FlatRecord`])
//! - **Field mapping model** ([`FieldMappingSpec`], [`MappingDescriptor`], [`SourceKind`])
//! - **Error types** ([`FeedError`], [`StoreError`], [`RecordError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FeedError>`]:
//!
//! ```rust
//! use novazen_feed::domain::{FeedError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(FeedError::Configuration("missing [store] section".to_string()))
//! }
//! ```

pub mod errors;
pub mod mapping;
pub mod product;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FeedError, RecordError, RecordStage, StoreError};
pub use mapping::{FieldMappingSpec, MappingDescriptor, RecordField, SourceKind};
pub use product::{FieldValue, FlatRecord, MetaAttributes, ProductId, RawProductRecord};
pub use result::Result;
