//! Data source abstractions for transaction history

use crate::core::transaction::{CollectionResult, RawTransaction};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One page request against a block-range filtered transaction listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery<'a> {
    pub action: &'a str,
    pub address: &'a str,
    pub start_block: u64,
    /// Inclusive upper bound; `None` means the chain tip.
    pub end_block: Option<u64>,
    pub page: u32,
    pub offset: usize,
    pub sort: SortOrder,
}

/// Fetches a single page of raw transactions.
///
/// Implementations own their transport retries; an error means the page could
/// not be fetched at all. Continuation across pages is the caller's concern.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<RawTransaction>>;
}

/// Fetches every transaction of every category for an address.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    async fn get_all_transactions(&self, address: &str) -> Result<CollectionResult>;
}
