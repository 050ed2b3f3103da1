//! Error types for the funding step
//!
//! Two families, mirroring how a deployment run fails:
//! - [`ConfigError`]: the settings on disk are missing, unreadable or malformed.
//! - [`TransferError`]: anything on the way to (or on) the chain went wrong.
//!
//! Neither is recovered locally. [`FundingError`] wraps both so the step can use `?`.

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Configuration failures. Fatal to the deployment run.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No entry for the requested network in the network settings.
    #[error("no network configuration entry for '{network}' (configured: {known:?})")]
    UnknownNetwork { network: String, known: Vec<String> },

    /// A settings or address-book file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A settings or address-book file is not valid TOML/JSON for its schema.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A field has a value the step cannot work with.
    #[error("invalid '{field}' for '{scope}': {message}")]
    InvalidValue {
        scope: String,
        field: String,
        message: String,
    },

    /// Error raised by the layered `config.toml` loader.
    #[error("deployer settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Failures while resolving the token or sending the transfers.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The token address for the network is absent, unset or not an address.
    #[error("token address for network '{0}' could not be resolved")]
    TokenUnresolved(String),

    /// The address book has no entry for a contract the step needs.
    #[error("contract '{0}' has not been deployed on this network")]
    ContractNotDeployed(String),

    /// `eth_getCode` returned nothing at the token address.
    #[error("no contract code at token address {0}")]
    NoTokenCode(Address),

    /// The RPC endpoint serves a different chain than the one configured.
    #[error("chain id mismatch: network configured for {expected}, RPC reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    /// The sending account cannot cover both transfers.
    #[error("insufficient token balance for {sender}: have {balance}, need {required}")]
    InsufficientBalance {
        sender: Address,
        balance: U256,
        required: U256,
    },

    /// The transaction was mined but reverted.
    #[error("transferAndCall to {to} reverted in transaction {transaction_hash}")]
    Reverted { to: Address, transaction_hash: B256 },

    /// The transaction was sent but no receipt arrived in time. It may still be mined.
    #[error("transaction {transaction_hash} was submitted but its receipt was not received: {reason}")]
    ReceiptUnavailable {
        transaction_hash: B256,
        reason: String,
    },

    /// Connection, DNS or timeout failure talking to the RPC endpoint.
    #[error("RPC provider error: {0}")]
    RpcProvider(String),

    /// Call or transaction rejected by the node.
    #[error("contract call failed: {0}")]
    ContractCall(String),

    /// No usable signing key.
    #[error("signer unavailable: {0}")]
    Signer(String),
}

/// Any failure of the funding step.
#[derive(Error, Debug)]
pub enum FundingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}
