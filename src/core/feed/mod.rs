//! Feed document output
//!
//! - [`writer`] - Header, item and footer serialization to an async sink
//! - [`regional`] - Shipping and tax blocks

pub mod regional;
pub mod writer;

pub use regional::RegionalBlock;
pub use writer::{render_item, FeedHeader, FeedWriter};
