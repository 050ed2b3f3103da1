//! Network configuration structures
//!
//! Defines the configuration format for networks.toml

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which aggregator flavour a network runs.
///
/// Only `full` networks fund the aggregators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AggregatorMode {
    Full,
    Light,
}

/// Token definition shared across networks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDefinition {
    /// Token symbol, used in logs
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Number of decimals; one whole unit is 10^decimals base units
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

impl Default for TokenDefinition {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

fn default_symbol() -> String {
    "LINK".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_true() -> bool {
    true
}

/// Settings for one network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Aggregator mode, written as `type` in the file
    #[serde(rename = "type")]
    pub mode: AggregatorMode,

    /// Expected EIP-155 chain id of the RPC endpoint (checked before sending)
    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Whether the network prices gas with EIP-1559; legacy networks get an explicit gas price
    #[serde(default = "default_true")]
    pub eip1559: bool,

    /// LINK token address
    /// Can be hardcoded or use env var substitution: "${ENV_VAR}"
    #[serde(default)]
    pub link_token: Option<String>,
}

/// Complete network configuration loaded from networks.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub token: TokenDefinition,

    /// Settings keyed by network name
    #[serde(default)]
    pub networks: HashMap<String, NetworkSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_config_parsing() {
        let toml = r#"
[token]
symbol = "LINK"
decimals = 18

[networks.ethereum]
type = "full"
chain_id = 1
link_token = "0x514910771AF9Ca656af840dff83E8264EcF986CA"

[networks.bsc]
type = "light"
chain_id = 56
eip1559 = false
link_token = "${BSC_LINK_TOKEN}"
"#;

        let config: NetworkConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.token.symbol, "LINK");
        assert_eq!(config.token.decimals, 18);
        assert_eq!(config.networks.len(), 2);

        let ethereum = config.networks.get("ethereum").unwrap();
        assert_eq!(ethereum.mode, AggregatorMode::Full);
        assert_eq!(ethereum.chain_id, Some(1));
        assert!(ethereum.eip1559);

        let bsc = config.networks.get("bsc").unwrap();
        assert_eq!(bsc.mode, AggregatorMode::Light);
        assert!(!bsc.eip1559);
        assert_eq!(bsc.link_token.as_deref(), Some("${BSC_LINK_TOKEN}"));
    }

    #[test]
    fn test_token_defaults() {
        let config: NetworkConfig = toml::from_str(
            r#"
[networks.kovan]
type = "full"
"#,
        )
        .unwrap();

        assert_eq!(config.token.symbol, "LINK");
        assert_eq!(config.token.decimals, 18);
        let kovan = config.networks.get("kovan").unwrap();
        assert_eq!(kovan.chain_id, None);
        assert_eq!(kovan.link_token, None);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<NetworkConfig, _> = toml::from_str(
            r#"
[networks.kovan]
type = "partial"
"#,
        );
        assert!(result.is_err());
    }
}
