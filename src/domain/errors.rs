//! Domain error types
//!
//! This module defines the error hierarchy for the feed generator.
//! Errors are domain-specific and don't expose third-party driver types.

use crate::domain::product::ProductId;
use std::fmt;
use thiserror::Error;

/// Main feed generator error type
///
/// Every fatal condition of a run ends up here. Per-record failures are
/// modelled separately by [`RecordError`] because they never abort a run.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Configuration-related errors (config file, mapping file, validation)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Field mapping errors detected while interpreting the mapping file
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Data store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Output sink errors (open, write, flush)
    #[error("Sink error: {0}")]
    Sink(String),

    /// A single record could not be turned into a feed item
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FeedError {
    /// Whether the error happened while establishing the store connection
    pub fn is_connection_error(&self) -> bool {
        matches!(self, FeedError::Store(StoreError::ConnectionFailed(_)))
    }
}

/// Data store errors
///
/// Errors raised by [`crate::adapters::store::ProductStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// A query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row could not be decoded
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// The store was used after being closed
    #[error("Store connection already closed")]
    Closed,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(e) => StoreError::ConnectionFailed(e.to_string()),
            sqlx::Error::Io(e) => StoreError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => StoreError::ConnectionFailed(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("timed out acquiring a connection".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::Closed,
            sqlx::Error::ColumnNotFound(col) => {
                StoreError::InvalidRow(format!("column not found: {col}"))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                StoreError::InvalidRow(format!("column {index}: {source}"))
            }
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

/// Stage of per-record processing at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStage {
    /// Lookups and derived-field computation
    Assembly,
    /// Mapping descriptor resolution
    Resolution,
    /// Rendering the item element
    Serialization,
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordStage::Assembly => "assembly",
            RecordStage::Resolution => "resolution",
            RecordStage::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// Failure of a single product record
///
/// Recoverable: the orchestrator logs it, counts the record as skipped and
/// moves on to the next record.
#[derive(Debug, Clone, Error)]
#[error("product {product_id} failed during {stage}: {message}")]
pub struct RecordError {
    /// Identifier of the failing product
    pub product_id: ProductId,

    /// Processing stage
    pub stage: RecordStage,

    /// Full failure detail
    pub message: String,
}

impl RecordError {
    /// Creates a new record error
    pub fn new(product_id: ProductId, stage: RecordStage, message: impl Into<String>) -> Self {
        Self {
            product_id,
            stage,
            message: message.into(),
        }
    }

    /// Assembly-stage failure
    pub fn assembly(product_id: ProductId, message: impl Into<String>) -> Self {
        Self::new(product_id, RecordStage::Assembly, message)
    }

    /// Serialization-stage failure
    pub fn serialization(product_id: ProductId, message: impl Into<String>) -> Self {
        Self::new(product_id, RecordStage::Serialization, message)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FeedError {
    fn from(err: toml::de::Error) -> Self {
        FeedError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<sqlx::Error> for FeedError {
    fn from(err: sqlx::Error) -> Self {
        FeedError::Store(err.into())
    }
}
