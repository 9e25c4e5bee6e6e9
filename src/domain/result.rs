//! Result type alias for the feed generator

use super::errors::FeedError;

/// Result type alias using [`FeedError`] as the error type
///
/// # Examples
///
/// ```
/// use novazen_feed::domain::result::Result;
/// use novazen_feed::domain::errors::FeedError;
///
/// fn failing_function() -> Result<()> {
///     Err(FeedError::Sink("disk full".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FeedError>;
