//! Network registry with configuration loading and token address resolution

use alloy::primitives::{Address, U256};
use std::path::Path;
use std::str::FromStr;

use super::config::{NetworkConfig, NetworkSettings, TokenDefinition};
use crate::errors::{ConfigError, TransferError};

/// Largest decimals value for which 10^decimals fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// Read-only view over `networks.toml`
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    config: NetworkConfig,
}

impl NetworkRegistry {
    /// Load and validate the network configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            networks = registry.config.networks.len(),
            token = %registry.config.token.symbol,
            "Loaded network configuration"
        );

        Ok(registry)
    }

    /// Parse and validate the network configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: NetworkConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        Self::new(config)
    }

    /// Wrap an already parsed configuration, rejecting values the step cannot use
    pub fn new(config: NetworkConfig) -> Result<Self, ConfigError> {
        if config.token.decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidValue {
                scope: config.token.symbol.clone(),
                field: "decimals".to_string(),
                message: format!("must be at most {MAX_DECIMALS}, got {}", config.token.decimals),
            });
        }

        // Env-substituted addresses are only known at run time; literal ones must parse now
        for (network, settings) in &config.networks {
            if let Some(address_str) = &settings.link_token {
                if !is_env_reference(address_str) && Address::from_str(address_str).is_err() {
                    return Err(ConfigError::InvalidValue {
                        scope: network.clone(),
                        field: "link_token".to_string(),
                        message: format!("'{address_str}' is not an address"),
                    });
                }
            }
        }

        Ok(Self { config })
    }

    /// Settings for a network, or [`ConfigError::UnknownNetwork`]
    pub fn settings(&self, network: &str) -> Result<&NetworkSettings, ConfigError> {
        self.config
            .networks
            .get(network)
            .ok_or_else(|| ConfigError::UnknownNetwork {
                network: network.to_string(),
                known: self.network_names(),
            })
    }

    /// The token definition shared by all networks
    pub fn token(&self) -> &TokenDefinition {
        &self.config.token
    }

    /// One whole token unit in base denomination: 10^decimals
    pub fn unit_amount(&self) -> U256 {
        U256::from(10u64).pow(U256::from(self.config.token.decimals))
    }

    /// Get resolved LINK token address for a network
    ///
    /// Handles environment variable substitution
    pub fn token_address(&self, network: &str) -> Result<Address, TransferError> {
        self.config
            .networks
            .get(network)
            .and_then(|settings| settings.link_token.as_deref())
            .and_then(Self::resolve_address)
            .ok_or_else(|| TransferError::TokenUnresolved(network.to_string()))
    }

    /// All configured network names, sorted
    pub fn network_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.config.networks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve address string with optional env var substitution
    ///
    /// Supports format: "${ENV_VAR_NAME}" or direct address
    fn resolve_address(address_str: &str) -> Option<Address> {
        let resolved = if is_env_reference(address_str) {
            let env_var_name = &address_str[2..address_str.len() - 1];
            match std::env::var(env_var_name) {
                Ok(val) => val,
                Err(_) => {
                    tracing::debug!(
                        env_var = env_var_name,
                        "Environment variable not found for token address"
                    );
                    return None;
                }
            }
        } else {
            address_str.to_string()
        };

        Address::from_str(resolved.trim()).ok()
    }
}

fn is_env_reference(value: &str) -> bool {
    value.len() > 3 && value.starts_with("${") && value.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::AggregatorMode;

    const NETWORKS: &str = r#"
[networks.ethereum]
type = "full"
chain_id = 1
link_token = "0x514910771AF9Ca656af840dff83E8264EcF986CA"

[networks.heco]
type = "light"

[networks.kovan]
type = "full"
link_token = "${AGGREGATOR_FUNDING_TEST_KOVAN_LINK}"

[networks.ropsten]
type = "full"
link_token = "${AGGREGATOR_FUNDING_TEST_UNSET_LINK}"
"#;

    #[test]
    fn test_settings_lookup() {
        let registry = NetworkRegistry::from_toml_str(NETWORKS).unwrap();

        assert_eq!(
            registry.settings("ethereum").unwrap().mode,
            AggregatorMode::Full
        );
        assert_eq!(registry.settings("heco").unwrap().mode, AggregatorMode::Light);
        assert!(matches!(
            registry.settings("rinkeby"),
            Err(ConfigError::UnknownNetwork { network, known })
                if network == "rinkeby" && known.len() == 4
        ));
        assert_eq!(
            registry.network_names(),
            vec!["ethereum", "heco", "kovan", "ropsten"]
        );
    }

    #[test]
    fn test_literal_token_address() {
        let registry = NetworkRegistry::from_toml_str(NETWORKS).unwrap();
        assert_eq!(
            registry.token_address("ethereum").unwrap(),
            Address::from_str("0x514910771AF9Ca656af840dff83E8264EcF986CA").unwrap()
        );
    }

    #[test]
    fn test_env_token_address() {
        std::env::set_var(
            "AGGREGATOR_FUNDING_TEST_KOVAN_LINK",
            "0xa36085F69e2889c224210F603D836748e7dC0088",
        );
        let registry = NetworkRegistry::from_toml_str(NETWORKS).unwrap();
        assert_eq!(
            registry.token_address("kovan").unwrap(),
            Address::from_str("0xa36085F69e2889c224210F603D836748e7dC0088").unwrap()
        );
    }

    #[test]
    fn test_unresolvable_token_address() {
        let registry = NetworkRegistry::from_toml_str(NETWORKS).unwrap();

        // Env var not set
        assert!(matches!(
            registry.token_address("ropsten"),
            Err(TransferError::TokenUnresolved(name)) if name == "ropsten"
        ));
        // No link_token at all
        assert!(matches!(
            registry.token_address("heco"),
            Err(TransferError::TokenUnresolved(_))
        ));
        // Unknown network
        assert!(registry.token_address("rinkeby").is_err());
    }

    #[test]
    fn test_malformed_literal_address_rejected() {
        let result = NetworkRegistry::from_toml_str(
            r#"
[networks.ethereum]
type = "full"
link_token = "0x1234"
"#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "link_token"));
        assert!(err.to_string().contains("ethereum"));
    }

    #[test]
    fn test_unit_amount() {
        let registry = NetworkRegistry::from_toml_str(NETWORKS).unwrap();
        assert_eq!(
            registry.unit_amount(),
            U256::from(1_000_000_000_000_000_000u128)
        );

        let six = NetworkRegistry::from_toml_str("[token]\ndecimals = 6\n").unwrap();
        assert_eq!(six.unit_amount(), U256::from(1_000_000u64));
    }

    #[test]
    fn test_decimals_out_of_range() {
        let result = NetworkRegistry::from_toml_str("[token]\ndecimals = 78\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.toml");
        std::fs::write(&path, NETWORKS).unwrap();

        let registry = NetworkRegistry::from_file(&path).unwrap();
        assert!(registry.settings("ethereum").is_ok());

        std::fs::remove_file(&path).ok();

        let missing = NetworkRegistry::from_file(&path);
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
