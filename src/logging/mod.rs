//! Logging and observability
//!
//! This module provides structured logging with:
//! - Human-readable console output
//! - JSON-formatted detail log file with rotation
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//!
//! # Example
//!
//! ```no_run
//! use novazen_feed::logging::init_logging;
//! use novazen_feed::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::console_only())
//!     .expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the progress of a page
///
/// # Example
///
/// ```no_run
/// use novazen_feed::log_page_progress;
///
/// log_page_progress!(3, 300, 1000);
/// ```
#[macro_export]
macro_rules! log_page_progress {
    ($page:expr, $processed:expr, $total:expr) => {
        tracing::info!(
            page = $page,
            processed = $processed,
            total = $total,
            progress_pct = ($processed as f64 / ($total as f64).max(1.0) * 100.0),
            "Page processed"
        );
    };
}

/// Log a record that was left out of the feed
///
/// # Example
///
/// ```no_run
/// use novazen_feed::log_record_skipped;
/// use novazen_feed::domain::{ProductId, RecordError};
///
/// let error = RecordError::assembly(ProductId::new(42), "meta lookup failed");
/// log_record_skipped!(&error);
/// ```
#[macro_export]
macro_rules! log_record_skipped {
    ($error:expr) => {
        tracing::error!(
            product_id = %$error.product_id,
            stage = %$error.stage,
            error = %$error.message,
            "Skipping product"
        );
    };
}

/// Log the completion of a generation run
///
/// # Example
///
/// ```no_run
/// use novazen_feed::log_generation_complete;
/// use std::time::Duration;
///
/// log_generation_complete!(980, 20, Duration::from_secs(42));
/// ```
#[macro_export]
macro_rules! log_generation_complete {
    ($written:expr, $skipped:expr, $duration:expr) => {
        tracing::info!(
            written = $written,
            skipped = $skipped,
            duration_ms = $duration.as_millis() as u64,
            "Feed generation completed"
        );
    };
}
