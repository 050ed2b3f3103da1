//! Deployment context supplied by the harness
//!
//! Holds the target network name and the address book of contracts deployed by
//! earlier migrations, keyed by contract name.

use alloy::primitives::Address;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{ConfigError, TransferError};

/// Address book name of the full aggregator contract.
pub const FULL_AGGREGATOR: &str = "FullAggregator";
/// Address book name of the light aggregator contract.
pub const LIGHT_AGGREGATOR: &str = "LightAggregator";

/// Network name reserved for local test runs; funding never runs there.
pub const TEST_NETWORK: &str = "test";

/// What the harness knows about the current deployment
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    /// Network name the deployment targets
    pub network: String,
    /// Deployed contract addresses by contract name
    deployed: HashMap<String, Address>,
}

impl DeploymentContext {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            deployed: HashMap::new(),
        }
    }

    /// Record a deployed contract address
    pub fn with_contract(mut self, name: impl Into<String>, address: Address) -> Self {
        self.deployed.insert(name.into(), address);
        self
    }

    /// Build a context from a JSON address book: `{ "FullAggregator": "0x…", ... }`
    pub fn from_file<P: AsRef<Path>>(
        network: impl Into<String>,
        path: P,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let deployed: HashMap<String, Address> =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            contracts = deployed.len(),
            "Loaded deployment address book"
        );

        Ok(Self {
            network: network.into(),
            deployed,
        })
    }

    /// Address of a deployed contract, or [`TransferError::ContractNotDeployed`]
    pub fn address_of(&self, name: &str) -> Result<Address, TransferError> {
        self.deployed
            .get(name)
            .copied()
            .ok_or_else(|| TransferError::ContractNotDeployed(name.to_string()))
    }

    pub fn is_test_network(&self) -> bool {
        self.network == TEST_NETWORK
    }
}
