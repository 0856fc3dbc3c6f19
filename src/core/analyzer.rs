//! Normalization of a whole fetch result.
//!
//! Categories are processed in [`TransactionCategory::ALL`] order and records
//! keep their source order within a category. A record that fails to
//! normalize is reported in [`AnalysisReport::failures`] and skipped, so one
//! bad record never costs the rest of the batch.

use crate::core::normalizer::normalize;
use crate::core::numeric::TimestampZone;
use crate::core::transaction::{CollectionResult, TransactionCategory, UnifiedTransaction};
use tracing::{debug, error, info, warn};

pub trait TransactionAnalyzer {
    fn analyze(&self, raw_transactions: &CollectionResult) -> AnalysisReport;
}

/// A record that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationFailure {
    pub category: TransactionCategory,
    pub transaction_hash: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub transactions: Vec<UnifiedTransaction>,
    pub failures: Vec<NormalizationFailure>,
    /// Records examined, whether or not they normalized.
    pub considered: usize,
    /// Keys of the input that name no known category, sorted.
    pub ignored_categories: Vec<String>,
}

impl AnalysisReport {
    pub fn normalized(&self) -> usize {
        self.transactions.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Normalized {} of {} transactions ({} failed)",
            self.normalized(),
            self.considered,
            self.failures.len()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct EthereumTransactionAnalyzer {
    zone: TimestampZone,
}

impl EthereumTransactionAnalyzer {
    pub fn new(zone: TimestampZone) -> Self {
        Self { zone }
    }
}

impl TransactionAnalyzer for EthereumTransactionAnalyzer {
    fn analyze(&self, raw_transactions: &CollectionResult) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        report.ignored_categories = raw_transactions
            .keys()
            .filter(|key| key.parse::<TransactionCategory>().is_err())
            .cloned()
            .collect();
        report.ignored_categories.sort();
        if !report.ignored_categories.is_empty() {
            warn!(categories = ?report.ignored_categories, "Ignoring unknown transaction categories");
        }

        for category in TransactionCategory::ALL {
            let Some(transactions) = raw_transactions.get(category.key()) else {
                continue;
            };
            debug!(category = %category, count = transactions.len(), "Processing transactions");

            for raw in transactions {
                report.considered += 1;
                match normalize(raw, category.label(), self.zone) {
                    Ok(unified) => report.transactions.push(unified),
                    Err(e) => {
                        let transaction_hash = raw.hash();
                        error!(
                            category = %category,
                            hash = transaction_hash.as_deref().unwrap_or("unknown"),
                            error = %e,
                            "Failed to process transaction"
                        );
                        report.failures.push(NormalizationFailure {
                            category,
                            transaction_hash,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            considered = report.considered,
            normalized = report.normalized(),
            failed = report.failures.len(),
            "Transaction analysis complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::RawTransaction;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_end_to_end_normal_transfer() {
        let mut collection = CollectionResult::new();
        collection.insert(
            "normal".to_string(),
            vec![raw(json!({
                "hash": "0xaaa",
                "timeStamp": "1640995200",
                "value": "1000000000000000000",
                "gasUsed": "21000",
                "gasPrice": "20000000000",
                "isError": "0"
            }))],
        );

        let report = EthereumTransactionAnalyzer::default().analyze(&collection);

        assert_eq!(report.transactions.len(), 1);
        let tx = &report.transactions[0];
        assert_eq!(tx.asset_symbol, "ETH");
        assert_eq!(tx.value_amount, "1");
        assert_eq!(tx.gas_fee, "0.00042");
        assert!(!tx.is_error);
        assert_eq!(report.considered, 1);
        assert!(report.failures.is_empty());
        assert!(report.ignored_categories.is_empty());
    }

    #[test]
    fn test_failing_record_is_skipped() {
        let mut collection = CollectionResult::new();
        collection.insert(
            "erc20".to_string(),
            vec![
                raw(json!({ "hash": "0x1", "tokenSymbol": "DAI" })),
                raw(json!({ "hash": "0x2", "tokenSymbol": ["not", "a", "symbol"] })),
                raw(json!({ "hash": "0x3", "tokenSymbol": "USDC" })),
            ],
        );

        let report = EthereumTransactionAnalyzer::default().analyze(&collection);

        assert_eq!(report.normalized(), 2);
        assert_eq!(report.considered, 3);
        let hashes: Vec<_> = report
            .transactions
            .iter()
            .map(|tx| tx.transaction_hash.as_str())
            .collect();
        assert_eq!(hashes, vec!["0x1", "0x3"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].category, TransactionCategory::Erc20);
        assert_eq!(report.failures[0].transaction_hash.as_deref(), Some("0x2"));
        assert!(report.failures[0].reason.contains("tokenSymbol"));
        assert_eq!(report.summary(), "Normalized 2 of 3 transactions (1 failed)");
    }

    #[test]
    fn test_categories_in_stable_order() {
        let mut collection = CollectionResult::new();
        collection.insert(
            "erc1155".to_string(),
            vec![RawTransaction::from_iter([("hash", "0xe")])],
        );
        collection.insert(
            "normal".to_string(),
            vec![
                RawTransaction::from_iter([("hash", "0xn1")]),
                RawTransaction::from_iter([("hash", "0xn2")]),
            ],
        );
        collection.insert(
            "internal".to_string(),
            vec![RawTransaction::from_iter([("hash", "0xi")])],
        );

        let report = EthereumTransactionAnalyzer::default().analyze(&collection);

        let labels: Vec<_> = report
            .transactions
            .iter()
            .map(|tx| (tx.transaction_hash.as_str(), tx.category_label.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("0xn1", "ETH Transfer"),
                ("0xn2", "ETH Transfer"),
                ("0xi", "Internal Transfer"),
                ("0xe", "ERC-1155 Transfer"),
            ]
        );
    }

    #[test]
    fn test_unknown_categories_are_ignored() {
        let mut collection = CollectionResult::new();
        collection.insert(
            "erc4337".to_string(),
            vec![RawTransaction::from_iter([("hash", "0xu")])],
        );
        collection.insert(
            "Normal".to_string(),
            vec![RawTransaction::from_iter([("hash", "0xcase")])],
        );
        collection.insert(
            "normal".to_string(),
            vec![RawTransaction::from_iter([("hash", "0xn")])],
        );

        let report = EthereumTransactionAnalyzer::default().analyze(&collection);

        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.transactions[0].transaction_hash, "0xn");
        assert_eq!(report.considered, 1);
        assert!(report.failures.is_empty());
        assert_eq!(report.ignored_categories, vec!["Normal", "erc4337"]);
    }
}
