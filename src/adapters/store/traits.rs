//! Product store abstraction
//!
//! This module defines the read-only interface the feed generator needs from
//! the catalog database. The MySQL adapter implements it for production and
//! [`crate::adapters::memory::MemoryStore`] implements it for tests.

use crate::domain::errors::StoreError;
use crate::domain::product::{MetaAttributes, ProductId, RawProductRecord};
use async_trait::async_trait;

/// Result alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-only access to the product catalog
///
/// A product is *eligible* when it is published and either a simple product
/// with a featured image, or a variation whose parent has a featured image.
/// `count_eligible` and `fetch_page` must agree on that definition, and pages
/// are ordered by ascending identifier so that offsets never overlap.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> StoreResult<()>;

    /// Count eligible products
    async fn count_eligible(&self) -> StoreResult<u64>;

    /// Fetch one page of eligible products in ascending identifier order
    ///
    /// # Arguments
    ///
    /// * `offset` - Number of eligible products to skip
    /// * `limit` - Maximum number of products to return
    async fn fetch_page(&self, offset: u64, limit: u64) -> StoreResult<Vec<RawProductRecord>>;

    /// Fetch all meta attributes of a product
    async fn fetch_meta(&self, id: ProductId) -> StoreResult<MetaAttributes>;

    /// Resolve the URL of an attachment
    ///
    /// Returns `None` when the attachment does not exist.
    async fn fetch_attachment_url(&self, id: ProductId) -> StoreResult<Option<String>>;

    /// Resolve the URLs of several attachments
    ///
    /// Results are ordered by attachment menu order, then by position in
    /// `ids`. Attachments that do not exist are left out.
    async fn fetch_attachment_urls(&self, ids: &[ProductId]) -> StoreResult<Vec<String>>;

    /// Name of the first product category assigned to a product
    async fn fetch_primary_category(&self, id: ProductId) -> StoreResult<Option<String>>;

    /// Release the underlying connection
    ///
    /// Any later call fails with [`StoreError::Closed`].
    async fn close(&self) -> StoreResult<()>;
}
