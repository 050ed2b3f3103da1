//! Deployer settings loaded from `config.toml`.
//!
//! Covers how the funding transfers are sent (balance pre-check, confirmations)
//! and how long the chain layer waits on RPC requests and receipts.
//!
//! The file is optional; a missing file yields the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

/// Complete deployer configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployerConfig {
    pub funding: FundingConfig,
    pub transaction: TransactionConfig,
}

impl DeployerConfig {
    /// Load configuration from a TOML file.
    ///
    /// If the file doesn't exist, returns the default configuration.
    /// If the file exists but is malformed, returns an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from environment variable CONFIG_FILE or default path.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(config_path)
    }
}

/// How the funding transfers are issued.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Check the sender holds enough tokens for both transfers before sending either.
    /// Off by default: a short balance then fails on the second transfer.
    pub check_balance: bool,
    /// Block confirmations to wait for on each transfer.
    pub confirmations: u64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            check_balance: false,
            confirmations: 1,
        }
    }
}

/// Chain-specific configuration for transaction timeouts and block times.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Average block time for this chain in seconds.
    pub block_time_seconds: u64,
    /// Number of blocks to wait when polling for transaction receipt.
    /// Receipt timeout = block_time_seconds * receipt_timeout_blocks.
    pub receipt_timeout_blocks: u64,
    /// Timeout for individual RPC requests in seconds.
    pub rpc_request_timeout_seconds: u64,
}

impl ChainConfig {
    /// Get the total receipt timeout duration.
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.block_time_seconds * self.receipt_timeout_blocks)
    }

    /// Get the RPC request timeout duration.
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_request_timeout_seconds)
    }
}

/// Transaction-related configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// RPC request timeout used when the network has no `chains` entry.
    pub default_rpc_timeout_seconds: u64,
    /// Receipt timeout used when the network has no `chains` entry.
    pub default_receipt_timeout_seconds: u64,
    /// TCP connect timeout for the RPC HTTP client.
    pub connection_timeout_seconds: u64,
    /// Per-network overrides, keyed by network name (e.g. "mainnet", "bsc").
    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            default_rpc_timeout_seconds: 30,
            default_receipt_timeout_seconds: 120,
            connection_timeout_seconds: 10,
            chains: HashMap::new(),
        }
    }
}

impl TransactionConfig {
    /// RPC request timeout for `network`.
    pub fn rpc_timeout(&self, network: &str) -> Duration {
        self.chains
            .get(network)
            .map(ChainConfig::rpc_timeout)
            .unwrap_or_else(|| Duration::from_secs(self.default_rpc_timeout_seconds))
    }

    /// Receipt wait timeout for `network`.
    pub fn receipt_timeout(&self, network: &str) -> Duration {
        self.chains
            .get(network)
            .map(ChainConfig::receipt_timeout)
            .unwrap_or_else(|| Duration::from_secs(self.default_receipt_timeout_seconds))
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeployerConfig::default();
        assert!(!config.funding.check_balance);
        assert_eq!(config.funding.confirmations, 1);
        assert_eq!(
            config.transaction.rpc_timeout("mainnet"),
            Duration::from_secs(30)
        );
        assert_eq!(
            config.transaction.receipt_timeout("mainnet"),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_chain_overrides() {
        let config_str = r#"
[funding]
check_balance = true

[transaction.chains.bsc]
block_time_seconds = 3
receipt_timeout_blocks = 20
rpc_request_timeout_seconds = 15
"#;

        let config: DeployerConfig = toml::from_str(config_str).unwrap();
        assert!(config.funding.check_balance);
        assert_eq!(config.funding.confirmations, 1);
        assert_eq!(config.transaction.receipt_timeout("bsc"), Duration::from_secs(60));
        assert_eq!(config.transaction.rpc_timeout("bsc"), Duration::from_secs(15));
        assert_eq!(config.transaction.rpc_timeout("heco"), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = DeployerConfig::from_file(&path).unwrap();
        assert_eq!(config.transaction.connection_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[funding]\nconfirmations = 3\n").unwrap();

        let config = DeployerConfig::from_file(&path).unwrap();
        assert_eq!(config.funding.confirmations, 3);
        assert!(!config.funding.check_balance);
    }
}
