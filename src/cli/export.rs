use super::ui;
use crate::core::analyzer::AnalysisReport;
use crate::core::{ExportSummary, TransactionAnalyzer, TransactionExporter, TransactionProvider};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{info, warn};

/// Checks for a `0x`-prefixed, 40 hex digit address.
pub fn validate_address(address: &str) -> bool {
    let hex_part = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex_part) => hex_part,
        None => return false,
    };
    hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn ensure_valid_address(address: &str) -> Result<()> {
    if !validate_address(address) {
        bail!(
            "Invalid Ethereum address '{}': expected 0x followed by 40 hexadecimal characters",
            address
        );
    }
    Ok(())
}

impl ExportSummary {
    pub fn display_as_table(&self, address: &str, report: &AnalysisReport) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Transaction type"),
            ui::header_cell("Count"),
        ]);
        for (label, count) in &self.by_category {
            table.add_row(vec![comfy_table::Cell::new(label), ui::count_cell(*count)]);
        }

        let date_range = match (&self.earliest, &self.latest) {
            (Some(earliest), Some(latest)) => format!(" (from {earliest} to {latest})"),
            _ => String::new(),
        };

        let mut output = format!(
            "Export summary for {}\n\n",
            ui::style_text(address, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}: {}{}",
            ui::style_text("Total transactions", ui::StyleType::TotalLabel),
            self.total,
            date_range
        ));
        output.push_str(&format!(
            "\n{}: {} ETH",
            ui::style_text("Total gas fees", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.6}", self.total_gas_fee),
                ui::StyleType::TotalValue
            )
        ));
        if !report.failures.is_empty() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&report.summary(), ui::StyleType::Error)
            ));
        }
        output
    }
}

/// Fetches, normalizes and exports the full history of `address`.
///
/// Returns the path of the written export.
pub async fn run(
    address: &str,
    provider: &(dyn TransactionProvider + Send + Sync),
    analyzer: &dyn TransactionAnalyzer,
    exporter: &dyn TransactionExporter,
) -> Result<PathBuf> {
    ensure_valid_address(address)?;

    info!(address, "Starting transaction analysis");

    let pb = ui::new_spinner("Fetching transactions...");
    let fetched = provider.get_all_transactions(address).await;
    pb.finish_and_clear();
    let raw_transactions = fetched?;

    let report = analyzer.analyze(&raw_transactions);
    if !report.failures.is_empty() {
        warn!(failed = report.failures.len(), "{}", report.summary());
    }

    let path = exporter
        .export(&report.transactions, address)
        .context("Failed to export transactions")?;

    let summary = ExportSummary::from_transactions(&report.transactions);
    println!("{}", summary.display_as_table(address, &report));

    Ok(path)
}
