use crate::core::numeric::TimestampZone;
use crate::core::paginator::DEFAULT_PAGE_SIZE;
use crate::core::provider::SortOrder;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Environment variable holding the Etherscan API key.
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

const DEFAULT_OUTPUT_DIR: &str = "transaction_reports";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EtherscanProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Sent as `chainid`, required by the multichain API.
    pub chain_id: Option<u64>,
    pub page_size: usize,
    pub sort: SortOrder,
    pub retries: usize,
    pub retry_delay_ms: u64,
    /// Pause between consecutive page requests.
    pub request_delay_ms: u64,
}

impl Default for EtherscanProviderConfig {
    fn default() -> Self {
        EtherscanProviderConfig {
            base_url: "https://api.etherscan.io/v2/api".to_string(),
            api_key: None,
            chain_id: Some(1),
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::Asc,
            retries: 3,
            retry_delay_ms: 1000,
            request_delay_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub etherscan: Option<EtherscanProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            etherscan: Some(EtherscanProviderConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub timestamp_zone: TimestampZone,
    /// Also append log records to this file.
    pub log_file: Option<String>,
}

impl AppConfig {
    /// Loads `config_path` if given, else the default config file if one
    /// exists, else built-in defaults.
    pub fn load_or_default(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::load_from_path(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// [`AppConfig::load_or_default`] with the API key from the environment
    /// or a `.env` file applied on top, then validated.
    pub fn load_for_run(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::load_or_default(config_path)?;
        config.apply_env_api_key(env_or_dotenv(API_KEY_ENV));
        config.validate()?;
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "ethtx", "ethtx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Non-empty `api_key` from the environment wins over the config file.
    pub fn apply_env_api_key(&mut self, api_key: Option<String>) {
        let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
            return;
        };
        debug!("Using API key from {}", API_KEY_ENV);
        self.providers
            .etherscan
            .get_or_insert_with(EtherscanProviderConfig::default)
            .api_key = Some(api_key);
    }

    pub fn validate(&self) -> Result<()> {
        let etherscan = self.etherscan();
        if etherscan.page_size == 0 {
            bail!("providers.etherscan.page_size must be greater than zero");
        }
        self.api_key()?;
        Ok(())
    }

    pub fn etherscan(&self) -> EtherscanProviderConfig {
        self.providers.etherscan.clone().unwrap_or_default()
    }

    pub fn api_key(&self) -> Result<String> {
        match self.etherscan().api_key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!(
                "{} is not set in the environment or providers.etherscan.api_key",
                API_KEY_ENV
            ),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }
}

/// Reads `key` from the process environment, falling back to the first `.env`
/// file found in the working directory or its parents.
pub fn env_or_dotenv(key: &str) -> Option<String> {
    std::env::var(key).ok().or_else(|| {
        let entries = dotenv::dotenv_iter().ok()?;
        find_entry(entries, key)
    })
}

/// Reads `key` from the dotenv file at `path` without touching the process
/// environment.
pub fn dotenv_value<P: AsRef<Path>>(path: P, key: &str) -> Result<Option<String>> {
    let entries = dotenv::from_path_iter(path.as_ref())
        .with_context(|| format!("Failed to read env file: {}", path.as_ref().display()))?;
    Ok(find_entry(entries, key))
}

fn find_entry<I>(entries: I, key: &str) -> Option<String>
where
    I: IntoIterator<Item = dotenv::Result<(String, String)>>,
{
    entries
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}
