pub mod cli;
pub mod core;
pub mod export;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::EthereumTransactionAnalyzer;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    /// Export the full transaction history of an address
    Export {
        address: String,
        output_dir: Option<PathBuf>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Ethereum Transaction Analyzer starting...");

    match command {
        AppCommand::Export {
            address,
            output_dir,
        } => {
            cli::export::ensure_valid_address(&address)?;

            let config = AppConfig::load_for_run(config_path)?;
            debug!(
                output_dir = ?config.output_dir,
                timestamp_zone = ?config.timestamp_zone,
                "Loaded config"
            );

            let provider = providers::EtherscanProvider::from_config(
                &config.etherscan(),
                &config.api_key()?,
            )?;
            let analyzer = EthereumTransactionAnalyzer::new(config.timestamp_zone);
            let exporter =
                export::CsvExporter::new(output_dir.unwrap_or_else(|| config.output_dir()));
            debug!(output_dir = %exporter.output_dir().display(), "Exporting to directory");

            let path = cli::export::run(&address, &provider, &analyzer, &exporter).await?;
            println!("\nTransactions exported to: {}", path.display());
            info!("Transaction analysis completed successfully");
            Ok(())
        }
    }
}
