//! Value transformation
//!
//! - [`sanitize`] - Plain-text cleanup of product bodies
//! - [`resolve`] - Mapping descriptor resolution against a flat record

pub mod resolve;
pub mod sanitize;

pub use resolve::resolve;
pub use sanitize::{sanitize, DEFAULT_DESCRIPTION_MAX_LENGTH};
