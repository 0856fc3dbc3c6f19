use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ethtx::core::config::AppConfig;
use ethtx::core::log::init_logging;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch, analyze and export the transaction history of an address
    Export {
        /// Ethereum address to analyze, including the 0x prefix
        #[arg(short, long)]
        address: String,

        /// Directory to write the CSV report to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = AppConfig::load_or_default(cli.config_path.as_deref())
        .ok()
        .and_then(|config| config.log_file);
    init_logging(cli.verbose, log_file.as_deref().map(Path::new))?;

    let result = match cli.command {
        Some(Commands::Setup) => ethtx::cli::setup::setup(),
        Some(Commands::Export {
            address,
            output_dir,
        }) => {
            ethtx::run_command(
                ethtx::AppCommand::Export {
                    address,
                    output_dir,
                },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
