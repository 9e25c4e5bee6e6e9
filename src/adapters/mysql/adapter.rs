//! MySQL adapter implementing the product store trait

use crate::adapters::mysql::client::MySqlClient;
use crate::adapters::store::{ProductStore, StoreResult};
use crate::domain::product::{MetaAttributes, ProductId, RawProductRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// MySQL implementation of [`ProductStore`]
pub struct MySqlStore {
    client: Arc<MySqlClient>,
}

impl MySqlStore {
    /// Create a new MySQL store
    pub fn new(client: MySqlClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<MySqlClient> {
        &self.client
    }
}

#[async_trait]
impl ProductStore for MySqlStore {
    async fn test_connection(&self) -> StoreResult<()> {
        self.client.test_connection().await
    }

    async fn count_eligible(&self) -> StoreResult<u64> {
        self.client.count_eligible().await
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> StoreResult<Vec<RawProductRecord>> {
        self.client.fetch_page(offset, limit).await
    }

    async fn fetch_meta(&self, id: ProductId) -> StoreResult<MetaAttributes> {
        self.client.fetch_meta(id).await
    }

    async fn fetch_attachment_url(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.client.fetch_attachment_url(id).await
    }

    async fn fetch_attachment_urls(&self, ids: &[ProductId]) -> StoreResult<Vec<String>> {
        self.client.fetch_attachment_urls(ids).await
    }

    async fn fetch_primary_category(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.client.fetch_primary_category(id).await
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.close().await;
        Ok(())
    }
}
