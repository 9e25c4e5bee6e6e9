//! Generation orchestration
//!
//! - [`coordinator`] - The run itself
//! - [`pages`] - Page cursor and run phases
//! - [`summary`] - Run summary and reporting

pub mod coordinator;
pub mod pages;
pub mod summary;

pub use coordinator::{FeedGenerator, GenerationOptions};
pub use pages::{Page, PageCursor, RunPhase};
pub use summary::GenerationSummary;
