//! Environment lookups for the chain layer.
//!
//! - `RPC_URL_<NETWORK>`: RPC endpoint per network, e.g. `RPC_URL_ETHEREUM`, `RPC_URL_BSC_TESTNET`
//! - `SIGNER_TYPE`: currently only `private-key` (the default)
//! - `EVM_PRIVATE_KEY`: deployer key; if comma-separated, the first key is used

use alloy::network::EthereumWallet;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;

use crate::errors::TransferError;

pub const ENV_SIGNER_TYPE: &str = "SIGNER_TYPE";
pub const ENV_EVM_PRIVATE_KEY: &str = "EVM_PRIVATE_KEY";

/// Name of the env var holding the RPC URL for `network`.
pub fn rpc_env_name_from_network(network: &str) -> String {
    let suffix: String = network
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("RPC_URL_{suffix}")
}

/// RPC URL for `network` from the environment.
pub fn rpc_url_from_env(network: &str) -> Result<String, TransferError> {
    let env_var = rpc_env_name_from_network(network);
    std::env::var(&env_var)
        .map_err(|_| TransferError::RpcProvider(format!("{env_var} is not set")))
}

/// Supported signer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerType {
    PrivateKey,
}

impl FromStr for SignerType {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private-key" => Ok(SignerType::PrivateKey),
            other => Err(TransferError::Signer(format!(
                "unsupported {ENV_SIGNER_TYPE} '{other}'"
            ))),
        }
    }
}

impl SignerType {
    /// Reads `SIGNER_TYPE`, defaulting to `private-key` when unset.
    pub fn from_env() -> Result<Self, TransferError> {
        match std::env::var(ENV_SIGNER_TYPE) {
            Ok(value) => value.parse(),
            Err(_) => Ok(SignerType::PrivateKey),
        }
    }

    pub fn make_evm_wallet(&self) -> Result<EthereumWallet, TransferError> {
        match self {
            SignerType::PrivateKey => {
                let keys = std::env::var(ENV_EVM_PRIVATE_KEY).map_err(|_| {
                    TransferError::Signer(format!("{ENV_EVM_PRIVATE_KEY} is not set"))
                })?;
                let signer = parse_first_key(&keys)?;
                tracing::debug!(address = %signer.address(), "Loaded deployer key");
                Ok(EthereumWallet::from(signer))
            }
        }
    }
}

fn parse_first_key(keys: &str) -> Result<PrivateKeySigner, TransferError> {
    let key = keys
        .split(',')
        .map(str::trim)
        .find(|k| !k.is_empty())
        .ok_or_else(|| TransferError::Signer(format!("{ENV_EVM_PRIVATE_KEY} is empty")))?;
    PrivateKeySigner::from_str(key)
        .map_err(|e| TransferError::Signer(format!("invalid {ENV_EVM_PRIVATE_KEY}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known anvil/hardhat development key #0
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_rpc_env_name() {
        assert_eq!(rpc_env_name_from_network("ethereum"), "RPC_URL_ETHEREUM");
        assert_eq!(rpc_env_name_from_network("bsc-testnet"), "RPC_URL_BSC_TESTNET");
        assert_eq!(rpc_env_name_from_network("arbitrum.one"), "RPC_URL_ARBITRUM_ONE");
    }

    #[test]
    fn test_rpc_url_missing() {
        let err = rpc_url_from_env("aggregator-funding-unset-network").unwrap_err();
        assert!(err
            .to_string()
            .contains("RPC_URL_AGGREGATOR_FUNDING_UNSET_NETWORK"));
    }

    #[test]
    fn test_signer_type_parse() {
        assert_eq!(
            "private-key".parse::<SignerType>().unwrap(),
            SignerType::PrivateKey
        );
        assert!(matches!(
            "ledger".parse::<SignerType>(),
            Err(TransferError::Signer(_))
        ));
    }

    #[test]
    fn test_parse_first_key() {
        let signer = parse_first_key(&format!(" {DEV_KEY} , 0xdeadbeef")).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(parse_first_key(" , ").is_err());
        assert!(parse_first_key("0x1234").is_err());
    }
}
