use super::generate_filename;
use crate::core::export::TransactionExporter;
use crate::core::transaction::UnifiedTransaction;
use anyhow::{Context, Result, bail};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one CSV file per export, headed by the unified field names.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_rows(path: &Path, transactions: &[UnifiedTransaction]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        for tx in transactions {
            writer
                .serialize(tx)
                .with_context(|| format!("Failed to write transaction {}", tx.transaction_hash))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
        Ok(())
    }
}

impl TransactionExporter for CsvExporter {
    fn export(&self, transactions: &[UnifiedTransaction], address: &str) -> Result<PathBuf> {
        if transactions.is_empty() {
            bail!("No transactions to export for {}", address);
        }

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        let path = self
            .output_dir
            .join(generate_filename(address, &Local::now(), "csv"));
        Self::write_rows(&path, transactions)?;

        info!(
            count = transactions.len(),
            path = %path.display(),
            "Successfully exported transactions"
        );
        Ok(path)
    }
}
