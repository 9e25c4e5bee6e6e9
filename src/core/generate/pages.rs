//! Paging over the eligible catalog
//!
//! [`PageCursor`] is the lazy, non-restartable sequence of pages a run
//! consumes. It owns the offset arithmetic and the record limit so that the
//! coordinator only ever sees records it has to process.

use crate::adapters::store::{ProductStore, StoreResult};
use crate::domain::product::RawProductRecord;
use std::fmt;
use std::sync::Arc;

/// Phase of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Counting eligible products
    Counting,
    /// Writing the header and preparing to page
    Paging,
    /// Waiting on a page fetch
    Fetching,
    /// Processing the records of a page
    Processing,
    /// Sleeping between pages
    Paused,
    /// Writing the footer
    Finalizing,
    /// Finished normally
    Done,
    /// Aborted by a fatal error
    Failed,
}

impl RunPhase {
    /// Move to `next`, logging the transition
    pub fn advance(&mut self, next: RunPhase) {
        if *self != next {
            tracing::debug!(from = %self, to = %next, "Run phase changed");
            *self = next;
        }
    }

    /// Whether the run has ended
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Counting => "counting",
            RunPhase::Paging => "paging",
            RunPhase::Fetching => "fetching",
            RunPhase::Processing => "processing",
            RunPhase::Paused => "paused",
            RunPhase::Finalizing => "finalizing",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Zero-based page number
    pub number: u64,
    /// Offset the page was fetched at
    pub offset: u64,
    /// Records in ascending identifier order
    pub records: Vec<RawProductRecord>,
}

/// Lazy sequence of pages
///
/// Offsets always advance by the configured page size. The last fetch is
/// shrunk so that a record limit is never exceeded. The sequence ends on an
/// empty page, once `total` records were yielded, or once the limit is hit.
pub struct PageCursor {
    store: Arc<dyn ProductStore + Send + Sync>,
    page_size: u64,
    total: u64,
    limit: Option<u64>,
    next_page: u64,
    yielded: u64,
    finished: bool,
}

impl PageCursor {
    /// Create a cursor over `total` eligible records
    pub fn new(
        store: Arc<dyn ProductStore + Send + Sync>,
        page_size: u64,
        total: u64,
        limit: Option<u64>,
    ) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            total,
            limit,
            next_page: 0,
            yielded: 0,
            finished: false,
        }
    }

    /// Records yielded so far
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Pages yielded so far
    pub fn pages(&self) -> u64 {
        self.next_page
    }

    fn remaining(&self) -> u64 {
        let by_total = self.total.saturating_sub(self.yielded);
        match self.limit {
            Some(limit) => by_total.min(limit.saturating_sub(self.yielded)),
            None => by_total,
        }
    }

    /// Whether another page may follow
    pub fn has_more(&self) -> bool {
        !self.finished && self.remaining() > 0
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates store errors; the cursor is finished afterwards.
    pub async fn next_page(&mut self) -> StoreResult<Option<Page>> {
        if !self.has_more() {
            self.finished = true;
            return Ok(None);
        }

        let fetch = match self.limit {
            Some(limit) => self.page_size.min(limit.saturating_sub(self.yielded)),
            None => self.page_size,
        };
        let offset = self.next_page * self.page_size;

        let records = match self.store.fetch_page(offset, fetch).await {
            Ok(records) => records,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if records.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        let number = self.next_page;
        self.next_page += 1;
        self.yielded += records.len() as u64;

        tracing::debug!(page = number, offset, fetched = records.len(), "Fetched page");
        Ok(Some(Page {
            number,
            offset,
            records,
        }))
    }
}
