//! MySQL client for the WooCommerce schema
//!
//! Holds the connection pool and the table names derived from the configured
//! prefix. All catalog queries used by the feed generator live here.

use crate::adapters::store::StoreResult;
use crate::config::DatabaseConfig;
use crate::domain::errors::{FeedError, StoreError};
use crate::domain::product::{MetaAttributes, ProductId, RawProductRecord};
use crate::domain::Result;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

/// Prefixed WordPress table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// `posts`
    pub posts: String,
    /// `postmeta`
    pub postmeta: String,
    /// `term_relationships`
    pub term_relationships: String,
    /// `term_taxonomy`
    pub term_taxonomy: String,
    /// `terms`
    pub terms: String,
}

impl TableNames {
    /// Builds table names from a validated prefix
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            posts: format!("{prefix}posts"),
            postmeta: format!("{prefix}postmeta"),
            term_relationships: format!("{prefix}term_relationships"),
            term_taxonomy: format!("{prefix}term_taxonomy"),
            terms: format!("{prefix}terms"),
        }
    }

    /// Filter selecting eligible products from `posts` aliased as `p`
    pub fn eligibility_filter(&self) -> String {
        format!(
            "p.post_status = 'publish' AND ( \
               (p.post_type = 'product' AND EXISTS ( \
                 SELECT 1 FROM {pm} pm WHERE pm.post_id = p.ID AND pm.meta_key = '_thumbnail_id')) \
               OR (p.post_type = 'product_variation' AND EXISTS ( \
                 SELECT 1 FROM {pm} pm WHERE pm.post_id = p.post_parent AND pm.meta_key = '_thumbnail_id')) \
             )",
            pm = self.postmeta
        )
    }
}

/// MySQL client for the WooCommerce catalog
///
/// Uses a single pooled connection; the generator issues its queries
/// sequentially.
pub struct MySqlClient {
    pool: MySqlPool,
    tables: TableNames,
    count_query: String,
    page_query: String,
    meta_query: String,
    attachment_query: String,
    category_query: String,
}

impl MySqlClient {
    /// Create a new client and open its connection
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] for a malformed connection string
    /// and a connection failure for anything that prevents connecting.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let options =
            MySqlConnectOptions::from_str(config.connection_string.expose_secret().as_ref())
                .map_err(|e| {
                    FeedError::Configuration(format!("Invalid MySQL connection string: {e}"))
                })?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("MySQL connection pool created");
        Ok(Self::with_pool(pool, &config.table_prefix))
    }

    /// Wraps an existing pool
    pub fn with_pool(pool: MySqlPool, table_prefix: &str) -> Self {
        let tables = TableNames::with_prefix(table_prefix);
        let filter = tables.eligibility_filter();

        Self {
            count_query: format!("SELECT COUNT(p.ID) FROM {} p WHERE {filter}", tables.posts),
            page_query: format!(
                "SELECT p.ID, p.post_title, p.post_content, p.post_parent, p.guid \
                 FROM {} p WHERE {filter} ORDER BY p.ID LIMIT ? OFFSET ?",
                tables.posts
            ),
            meta_query: format!(
                "SELECT meta_key, meta_value FROM {} WHERE post_id = ?",
                tables.postmeta
            ),
            attachment_query: format!("SELECT guid FROM {} WHERE ID = ?", tables.posts),
            category_query: format!(
                "SELECT t.name FROM {tr} tr \
                 JOIN {tt} tt ON tr.term_taxonomy_id = tt.term_taxonomy_id \
                 JOIN {t} t ON tt.term_id = t.term_id \
                 WHERE tr.object_id = ? AND tt.taxonomy = 'product_cat' \
                 ORDER BY tr.term_order LIMIT 1",
                tr = tables.term_relationships,
                tt = tables.term_taxonomy,
                t = tables.terms
            ),
            pool,
            tables,
        }
    }

    /// Table names in use
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Test the connection with a trivial query
    pub async fn test_connection(&self) -> StoreResult<()> {
        self.ensure_open()?;
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("Connection test failed: {e}")))?;

        tracing::info!("MySQL connection test successful");
        Ok(())
    }

    /// Count eligible products
    pub async fn count_eligible(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        let count: i64 = sqlx::query_scalar(&self.count_query)
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|_| StoreError::InvalidRow(format!("negative count {count}")))
    }

    /// Fetch one page of eligible products
    pub async fn fetch_page(&self, offset: u64, limit: u64) -> StoreResult<Vec<RawProductRecord>> {
        self.ensure_open()?;
        let rows = sqlx::query(&self.page_query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Fetch all meta attributes of a product
    pub async fn fetch_meta(&self, id: ProductId) -> StoreResult<MetaAttributes> {
        self.ensure_open()?;
        let rows = sqlx::query(&self.meta_query)
            .bind(id.get())
            .fetch_all(&self.pool)
            .await?;

        let mut meta = MetaAttributes::new();
        for row in rows {
            let key: Option<String> = row.try_get("meta_key")?;
            let value: Option<String> = row.try_get("meta_value")?;
            if let Some(key) = key {
                meta.insert(key, value.unwrap_or_default());
            }
        }
        Ok(meta)
    }

    /// Resolve the URL of an attachment
    pub async fn fetch_attachment_url(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.ensure_open()?;
        let guid: Option<String> = sqlx::query_scalar(&self.attachment_query)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(guid)
    }

    /// Resolve the URLs of several attachments
    ///
    /// Ties on `menu_order` keep the order of `ids`.
    pub async fn fetch_attachment_urls(&self, ids: &[ProductId]) -> StoreResult<Vec<String>> {
        self.ensure_open()?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT guid FROM {} WHERE ID IN ({placeholders}) \
             ORDER BY menu_order ASC, FIELD(ID, {placeholders})",
            self.tables.posts
        );

        let mut query = sqlx::query_scalar::<MySql, String>(&sql);
        for id in ids.iter().chain(ids.iter()) {
            query = query.bind(id.get());
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Name of the first `product_cat` term of a product
    pub async fn fetch_primary_category(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.ensure_open()?;
        let name: Option<String> = sqlx::query_scalar(&self.category_query)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("MySQL connection pool closed");
    }
}

fn product_from_row(row: &MySqlRow) -> StoreResult<RawProductRecord> {
    let id: u64 = row.try_get("ID")?;
    let parent: u64 = row.try_get("post_parent")?;

    Ok(RawProductRecord {
        id: ProductId::new(id),
        title: row.try_get("post_title")?,
        content: row.try_get("post_content")?,
        parent: ProductId::new(parent),
        guid: row.try_get("guid")?,
    })
}
