use super::util::with_retry;
use crate::core::config::EtherscanProviderConfig;
use crate::core::paginator::CategoryPaginator;
use crate::core::provider::{PageQuery, PageSource, SortOrder, TransactionProvider};
use crate::core::transaction::{CollectionResult, RawTransaction, TransactionCategory};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    result: Option<EtherscanResult>,
}

/// Listings carry an array; errors carry a message string in the same slot.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EtherscanResult {
    Records(Vec<RawTransaction>),
    Message(String),
}

impl EtherscanResponse {
    fn into_records(self) -> Result<Vec<RawTransaction>> {
        match self.result {
            Some(EtherscanResult::Records(records))
                if self.status != "0"
                    || !records.is_empty()
                    || self.message.starts_with(NO_TRANSACTIONS_MESSAGE) =>
            {
                Ok(records)
            }
            Some(EtherscanResult::Message(detail)) => {
                bail!("Etherscan error: {} ({})", self.message, detail)
            }
            Some(EtherscanResult::Records(_)) | None if self.status == "0" => {
                bail!("Etherscan error: {}", self.message)
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// Page source backed by the Etherscan `account` module.
pub struct EtherscanClient {
    base_url: String,
    api_key: String,
    chain_id: Option<u64>,
    retries: usize,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl EtherscanClient {
    pub fn new(config: &EtherscanProviderConfig, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ethtx/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(EtherscanClient {
            base_url: config.base_url.clone(),
            api_key: api_key.to_string(),
            chain_id: config.chain_id,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
            client,
        })
    }

    fn request_url(&self, query: &PageQuery<'_>) -> Result<Url> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", query.action.to_string()),
            ("address", query.address.to_string()),
            ("startblock", query.start_block.to_string()),
            (
                "endblock",
                query
                    .end_block
                    .map_or_else(|| "latest".to_string(), |block| block.to_string()),
            ),
            ("page", query.page.to_string()),
            ("offset", query.offset.to_string()),
            ("sort", query.sort.as_str().to_string()),
            ("apikey", self.api_key.clone()),
        ];
        if let Some(chain_id) = self.chain_id {
            params.insert(0, ("chainid", chain_id.to_string()));
        }

        Url::parse_with_params(&self.base_url, &params)
            .with_context(|| format!("Invalid Etherscan base URL: {}", self.base_url))
    }

    async fn request_page(&self, url: &Url) -> Result<Vec<RawTransaction>> {
        // Errors must not echo the URL, it carries the API key
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)
            .context("Etherscan request error")?;

        let body = response
            .json::<EtherscanResponse>()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Etherscan response")?;
        debug!(status = %body.status, message = %body.message, "Received Etherscan response");

        body.into_records()
    }
}

#[async_trait]
impl PageSource for EtherscanClient {
    #[instrument(
        name = "EtherscanPageFetch",
        skip(self, query),
        fields(action = %query.action, start_block = query.start_block)
    )]
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<RawTransaction>> {
        let url = self.request_url(query)?;
        let records = with_retry(|| self.request_page(&url), self.retries, self.retry_delay_ms)
            .await
            .with_context(|| format!("Failed to fetch `{}` transactions", query.action))?;
        debug!(count = records.len(), "Fetched transaction page");
        Ok(records)
    }
}

/// Fetches all five categories for an address, one exhaustive listing each.
pub struct EtherscanProvider<S: PageSource = EtherscanClient> {
    source: S,
    page_size: usize,
    sort: SortOrder,
    page_delay: Duration,
}

impl EtherscanProvider<EtherscanClient> {
    pub fn from_config(config: &EtherscanProviderConfig, api_key: &str) -> Result<Self> {
        let client = EtherscanClient::new(config, api_key)?;
        Ok(EtherscanProvider::new(client)
            .with_page_size(config.page_size)
            .with_sort(config.sort)
            .with_page_delay(Duration::from_millis(config.request_delay_ms)))
    }
}

impl<S: PageSource> EtherscanProvider<S> {
    pub fn new(source: S) -> Self {
        EtherscanProvider {
            source,
            page_size: crate::core::paginator::DEFAULT_PAGE_SIZE,
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

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }
}

#[async_trait]
impl<S: PageSource> TransactionProvider for EtherscanProvider<S> {
    async fn get_all_transactions(&self, address: &str) -> Result<CollectionResult> {
        info!(address, "Starting comprehensive transaction fetch");

        let paginator = CategoryPaginator::new(&self.source)
            .with_page_size(self.page_size)
            .with_sort(self.sort)
            .with_page_delay(self.page_delay);

        let mut results = CollectionResult::new();
        for category in TransactionCategory::ALL {
            let transactions = paginator
                .fetch_all(address, category.action())
                .await
                .with_context(|| format!("Error fetching {category} transactions for {address}"))?;
            info!(category = %category, count = transactions.len(), "Fetched transactions");
            results.insert(category.key().to_string(), transactions);
        }

        let total: usize = results.values().map(Vec::len).sum();
        info!(total, "Successfully fetched transactions");
        Ok(results)
    }
}
