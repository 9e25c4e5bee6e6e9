//! Product store factory

use crate::adapters::mysql::{MySqlClient, MySqlStore};
use crate::adapters::store::traits::ProductStore;
use crate::config::DatabaseConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the product store for a database configuration
///
/// The connection is verified before the store is returned.
///
/// # Errors
///
/// Returns [`crate::domain::FeedError::Store`] with a connection failure if
/// the database cannot be reached.
pub async fn create_product_store(
    config: &DatabaseConfig,
) -> Result<Arc<dyn ProductStore + Send + Sync>> {
    tracing::info!(table_prefix = %config.table_prefix, "Creating MySQL product store");
    let client = MySqlClient::new(config).await?;
    let store = MySqlStore::new(client);
    store.test_connection().await?;

    Ok(Arc::new(store) as Arc<dyn ProductStore + Send + Sync>)
}
