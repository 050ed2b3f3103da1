//! Token capability used by the funding step.
//!
//! The step only needs two things from the chain: a way to get a handle on the
//! token contract for a network ([`TokenConnector`]), and the handle's
//! `transferAndCall` / `balanceOf` ([`FundingToken`]). [`evm`] implements both
//! over alloy.

use alloy::primitives::{Address, B256, Bytes, U256};
use std::future::Future;

use crate::errors::TransferError;
use crate::networks::NetworkSettings;

pub mod evm;

/// Outcome of one mined `transferAndCall`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Recipient of the transfer.
    pub recipient: Address,
    /// Amount transferred, in base units.
    pub amount: U256,
}

/// Handle to a deployed ERC-677 token, bound to a sending account.
pub trait FundingToken {
    /// Token contract address.
    fn address(&self) -> Address;

    /// Account the transfers are sent from.
    fn sender(&self) -> Address;

    /// Token balance of `owner`.
    fn balance_of(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<U256, TransferError>> + Send;

    /// Transfer `amount` to `to` and invoke its `onTokenTransfer` with `data`.
    ///
    /// Resolves once the transaction is mined; a reverted transaction is an error.
    fn transfer_and_call(
        &self,
        to: Address,
        amount: U256,
        data: Bytes,
    ) -> impl Future<Output = Result<TransferReceipt, TransferError>> + Send;
}

/// Resolves a [`FundingToken`] handle for a network.
pub trait TokenConnector {
    type Token: FundingToken;

    /// Connect to the token at `token` on `network`.
    fn connect(
        &self,
        network: &str,
        settings: &NetworkSettings,
        token: Address,
    ) -> impl Future<Output = Result<Self::Token, TransferError>> + Send;
}
