//! In-memory product store
//!
//! Mirrors the eligibility, ordering and lookup semantics of the MySQL store
//! over data held in memory. Used for tests and for dry runs against
//! fixture catalogs. Individual lookups can be made to fail so that
//! per-record and fatal error paths can be exercised.

use crate::adapters::store::{ProductStore, StoreResult};
use crate::domain::errors::StoreError;
use crate::domain::product::{MetaAttributes, ProductId, RawProductRecord};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// WordPress post type of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    /// `product`
    Product,
    /// `product_variation`
    Variation,
    /// Anything else (pages, attachments, orders)
    Other,
}

#[derive(Debug, Clone)]
struct StoredPost {
    record: RawProductRecord,
    post_type: PostType,
    status: String,
}

#[derive(Debug, Clone)]
struct Attachment {
    url: String,
    menu_order: i64,
}

/// Product store backed by in-memory maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: BTreeMap<ProductId, StoredPost>,
    meta: HashMap<ProductId, MetaAttributes>,
    attachments: HashMap<ProductId, Attachment>,
    categories: HashMap<ProductId, Vec<String>>,
    failing_lookups: HashSet<ProductId>,
    failing_pages: HashSet<u64>,
    fail_count: bool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
    meta_calls: AtomicUsize,
    page_calls: Mutex<Vec<(u64, u64)>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post with explicit type and status
    pub fn with_post(
        mut self,
        record: RawProductRecord,
        post_type: PostType,
        status: &str,
        meta: MetaAttributes,
    ) -> Self {
        let id = record.id;
        self.posts.insert(
            id,
            StoredPost {
                record,
                post_type,
                status: status.to_string(),
            },
        );
        self.meta.insert(id, meta);
        self
    }

    /// Add a published simple product
    pub fn with_product(self, record: RawProductRecord, meta: MetaAttributes) -> Self {
        self.with_post(record, PostType::Product, "publish", meta)
    }

    /// Add a published variation
    pub fn with_variation(self, record: RawProductRecord, meta: MetaAttributes) -> Self {
        self.with_post(record, PostType::Variation, "publish", meta)
    }

    /// Add an attachment
    pub fn with_attachment(mut self, id: u64, url: &str, menu_order: i64) -> Self {
        self.attachments.insert(
            ProductId::new(id),
            Attachment {
                url: url.to_string(),
                menu_order,
            },
        );
        self
    }

    /// Assign a category; earlier assignments sort first
    pub fn with_category(mut self, id: u64, name: &str) -> Self {
        self.categories
            .entry(ProductId::new(id))
            .or_default()
            .push(name.to_string());
        self
    }

    /// Make every per-product lookup for `id` fail
    pub fn fail_lookups_for(mut self, id: u64) -> Self {
        self.failing_lookups.insert(ProductId::new(id));
        self
    }

    /// Make the page fetch starting at `offset` fail
    pub fn fail_page_at(mut self, offset: u64) -> Self {
        self.failing_pages.insert(offset);
        self
    }

    /// Make the eligibility count fail
    pub fn fail_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    /// Number of `close` calls received
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_meta` calls received
    pub fn meta_calls(&self) -> usize {
        self.meta_calls.load(Ordering::SeqCst)
    }

    /// `(offset, limit)` of every page fetch, in call order
    pub fn page_calls(&self) -> Vec<(u64, u64)> {
        self.page_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn has_thumbnail(&self, id: ProductId) -> bool {
        self.meta
            .get(&id)
            .is_some_and(|meta| meta.get("_thumbnail_id").is_some())
    }

    fn is_eligible(&self, post: &StoredPost) -> bool {
        if post.status != "publish" {
            return false;
        }
        match post.post_type {
            PostType::Product => self.has_thumbnail(post.record.id),
            PostType::Variation => self.has_thumbnail(post.record.parent),
            PostType::Other => false,
        }
    }

    fn eligible(&self) -> impl Iterator<Item = &StoredPost> {
        // BTreeMap iteration is ascending by id
        self.posts.values().filter(move |post| self.is_eligible(post))
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn ensure_lookup_allowed(&self, id: ProductId) -> StoreResult<()> {
        self.ensure_open()?;
        if self.failing_lookups.contains(&id) {
            return Err(StoreError::QueryFailed(format!(
                "injected lookup failure for {id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn test_connection(&self) -> StoreResult<()> {
        self.ensure_open()
    }

    async fn count_eligible(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        if self.fail_count {
            return Err(StoreError::QueryFailed("injected count failure".to_string()));
        }
        Ok(self.eligible().count() as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> StoreResult<Vec<RawProductRecord>> {
        self.ensure_open()?;
        self.page_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((offset, limit));

        if self.failing_pages.contains(&offset) {
            return Err(StoreError::QueryFailed(format!(
                "injected page failure at offset {offset}"
            )));
        }

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .eligible()
            .skip(skip)
            .take(take)
            .map(|post| post.record.clone())
            .collect())
    }

    async fn fetch_meta(&self, id: ProductId) -> StoreResult<MetaAttributes> {
        self.meta_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_lookup_allowed(id)?;
        Ok(self.meta.get(&id).cloned().unwrap_or_default())
    }

    async fn fetch_attachment_url(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.ensure_lookup_allowed(id)?;
        Ok(self.attachments.get(&id).map(|a| a.url.clone()))
    }

    async fn fetch_attachment_urls(&self, ids: &[ProductId]) -> StoreResult<Vec<String>> {
        self.ensure_open()?;
        for id in ids {
            self.ensure_lookup_allowed(*id)?;
        }

        let mut found: Vec<(i64, usize, &Attachment)> = ids
            .iter()
            .enumerate()
            .filter_map(|(pos, id)| self.attachments.get(id).map(|a| (a.menu_order, pos, a)))
            .collect();
        found.sort_by_key(|(menu_order, pos, _)| (*menu_order, *pos));

        Ok(found.into_iter().map(|(_, _, a)| a.url.clone()).collect())
    }

    async fn fetch_primary_category(&self, id: ProductId) -> StoreResult<Option<String>> {
        self.ensure_lookup_allowed(id)?;
        Ok(self
            .categories
            .get(&id)
            .and_then(|names| names.first().cloned()))
    }

    async fn close(&self) -> StoreResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
