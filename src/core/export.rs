//! Export abstractions and the post-export summary

use crate::core::transaction::UnifiedTransaction;
use anyhow::Result;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// Writes unified transactions somewhere durable.
///
/// Implementations must reject an empty slice and must keep every record in
/// the order given.
pub trait TransactionExporter {
    fn export(&self, transactions: &[UnifiedTransaction], address: &str) -> Result<PathBuf>;
}

/// Totals over an exported transaction list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub total: usize,
    /// Count per category label, in order of first appearance.
    pub by_category: Vec<(String, usize)>,
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub total_gas_fee: Decimal,
}

impl ExportSummary {
    pub fn from_transactions(transactions: &[UnifiedTransaction]) -> Self {
        let mut by_category: Vec<(String, usize)> = Vec::new();
        for tx in transactions {
            match by_category
                .iter_mut()
                .find(|(label, _)| *label == tx.category_label)
            {
                Some((_, count)) => *count += 1,
                None => by_category.push((tx.category_label.clone(), 1)),
            }
        }

        // `YYYY-MM-DD HH:MM:SS` orders chronologically as text
        let dated = transactions
            .iter()
            .map(|tx| tx.occurred_at.as_str())
            .filter(|at| !at.is_empty());
        let earliest = dated.clone().min().map(str::to_string);
        let latest = dated.max().map(str::to_string);

        let total_gas_fee = transactions
            .iter()
            .filter_map(|tx| Decimal::from_str(&tx.gas_fee).ok())
            .fold(Decimal::ZERO, |sum, fee| sum.saturating_add(fee));

        Self {
            total: transactions.len(),
            by_category,
            earliest,
            latest,
            total_gas_fee,
        }
    }
}
