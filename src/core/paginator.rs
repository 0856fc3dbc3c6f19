//! Exhaustive retrieval of one transaction category.
//!
//! The explorer caps every listing at `page_size` records, so the paginator
//! walks the chain with a block cursor instead of page numbers. In ascending
//! order, after a full page ending at block `b` the next request starts at
//! `b + 1`. Fetching stops once a page comes back short, or when a full page
//! ends on the block it started from: more than `page_size` records share
//! that block and the cursor cannot move forward.

use crate::core::provider::{PageQuery, PageSource, SortOrder};
use crate::core::transaction::RawTransaction;
use anyhow::{Context, Result, anyhow, bail};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_PAGE_SIZE: usize = 10_000;

pub struct CategoryPaginator<'a, S: PageSource + ?Sized> {
    source: &'a S,
    page_size: usize,
    sort: SortOrder,
    page_delay: Duration,
}

impl<'a, S: PageSource + ?Sized> CategoryPaginator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Asc,
            page_delay: Duration::ZERO,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Pause between consecutive page requests, for rate limited sources.
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Fetches every record of `action` for `address`, in source order.
    ///
    /// Fails as soon as any page fails; partial results are never returned.
    #[instrument(name = "CategoryFetch", skip(self), fields(action = %action))]
    pub async fn fetch_all(&self, address: &str, action: &str) -> Result<Vec<RawTransaction>> {
        if self.page_size == 0 {
            bail!("Page size must be greater than zero");
        }

        let mut transactions = Vec::new();
        let mut start_block = 0;
        let mut end_block = None;
        let mut batch = 1;

        loop {
            if batch > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let query = PageQuery {
                action,
                address,
                start_block,
                end_block,
                page: 1,
                offset: self.page_size,
                sort: self.sort,
            };
            debug!(batch, start_block, ?end_block, "Fetching transaction batch");

            let page = self
                .source
                .fetch_page(&query)
                .await
                .with_context(|| format!("Failed to fetch batch {batch} of `{action}` for {address}"))?;

            let received = page.len();
            let last_block = page.last().map(RawTransaction::block_number);
            transactions.extend(page);

            if received < self.page_size {
                debug!(batch, received, "Received a partial batch, done");
                break;
            }

            let last_block = last_block.flatten().ok_or_else(|| {
                anyhow!("Last transaction of batch {batch} of `{action}` has no valid block number")
            })?;

            match self.sort {
                SortOrder::Asc => {
                    if last_block <= start_block {
                        warn!(
                            block = last_block,
                            page_size = self.page_size,
                            "Batch ends on its starting block, cannot advance"
                        );
                        break;
                    }
                    start_block = last_block + 1;
                }
                SortOrder::Desc => {
                    if end_block.is_some_and(|end| last_block >= end) || last_block == 0 {
                        warn!(
                            block = last_block,
                            page_size = self.page_size,
                            "Batch ends on its starting block, cannot advance"
                        );
                        break;
                    }
                    end_block = Some(last_block - 1);
                }
            }
            batch += 1;
        }

        debug!(batches = batch, total = transactions.len(), "Fetched all batches");
        Ok(transactions)
    }
}
