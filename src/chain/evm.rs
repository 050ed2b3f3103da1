//! EVM implementation of the funding token capability.
//!
//! - **Connect**: build a signing provider for the network's RPC endpoint, check the
//!   endpoint serves the configured chain, and check the token address holds code.
//! - **Transfer**: encode ERC-677 `transferAndCall` and send it as a plain transaction,
//!   waiting for the receipt under the per-chain timeout.
//!
//! Assumptions:
//! - The token implements ERC-677 (`transferAndCall(address,uint256,bytes)`), as LINK does.
//! - One signer per run; transfers are sent one after another from it.

use alloy::network::{Ethereum, EthereumWallet, NetworkWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::chain::{FundingToken, TokenConnector, TransferReceipt};
use crate::config::{DeployerConfig, TransactionConfig};
use crate::errors::TransferError;
use crate::from_env;
use crate::networks::NetworkSettings;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface ILinkToken {
        function balanceOf(address owner) external view returns (uint256 balance);
        function transferAndCall(address to, uint256 value, bytes data) external returns (bool success);
    }
}

/// Signing provider for a single network.
pub struct EvmProvider {
    /// Provider with gas, nonce, chain id and wallet fillers.
    inner: DynProvider,
    /// Whether the network supports EIP-1559 gas pricing.
    eip1559: bool,
    /// Network name, for logs.
    network: String,
    /// Address transactions are signed by.
    sender: Address,
    /// How long to wait for a receipt.
    receipt_timeout: Duration,
}

impl EvmProvider {
    /// Build an [`EvmProvider`] for `rpc_url` with timeouts from `config`.
    pub fn try_new(
        wallet: EthereumWallet,
        rpc_url: &str,
        eip1559: bool,
        network: &str,
        config: &TransactionConfig,
    ) -> Result<Self, TransferError> {
        let sender = NetworkWallet::<Ethereum>::default_signer_address(&wallet);
        let rpc_timeout = config.rpc_timeout(network);
        let receipt_timeout = config.receipt_timeout(network);

        let url = rpc_url.parse::<url::Url>().map_err(|e| {
            tracing::error!("Invalid RPC URL {rpc_url}: {e:?}");
            TransferError::RpcProvider(format!("Invalid RPC URL: {rpc_url}"))
        })?;

        tracing::debug!(
            network,
            rpc_timeout_secs = rpc_timeout.as_secs(),
            receipt_timeout_secs = receipt_timeout.as_secs(),
            "Configuring RPC client with timeout"
        );

        // Bounded HTTP client so a stuck endpoint cannot hang the deployment
        let http_client = alloy::transports::http::reqwest::Client::builder()
            .connect_timeout(config.connection_timeout())
            .timeout(rpc_timeout)
            .build()
            .map_err(|e| {
                tracing::error!("HTTP client build failed: {e:?}");
                TransferError::RpcProvider(format!("HTTP client initialization failed: {e}"))
            })?;

        let client = RpcClient::builder().http_with_client(http_client, url);

        let inner = ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(client)
            .erased();

        tracing::info!(network, rpc = rpc_url, %sender, "Initialized provider");

        Ok(Self {
            inner,
            eip1559,
            network: network.to_string(),
            sender,
            receipt_timeout,
        })
    }

    pub fn inner(&self) -> &DynProvider {
        &self.inner
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Fail unless the RPC endpoint reports `expected` as its chain id.
    pub async fn assert_chain_id(&self, expected: u64) -> Result<(), TransferError> {
        let actual = self
            .inner
            .get_chain_id()
            .into_future()
            .instrument(tracing::info_span!("get_chain_id", otel.kind = "client"))
            .await
            .map_err(|e| categorize_transport_error(e, "eth_chainId"))?;

        if actual != expected {
            tracing::error!(network = %self.network, expected, actual, "RPC serves a different chain");
            return Err(TransferError::ChainIdMismatch { expected, actual });
        }
        Ok(())
    }

    /// Check whether contract code is present at `address`.
    pub async fn is_contract_deployed(&self, address: Address) -> Result<bool, TransferError> {
        let code = self
            .inner
            .get_code_at(address)
            .into_future()
            .instrument(tracing::info_span!("get_code_at",
                address = %address,
                otel.kind = "client",
            ))
            .await
            .map_err(|e| categorize_transport_error(e, "get_code_at"))?;
        Ok(!code.is_empty())
    }

    /// Send a transaction with provided `to` and `calldata` from the provider's signer.
    ///
    /// On legacy networks the gas price is fetched and set explicitly; EIP-1559 networks
    /// leave pricing to the fillers. Waits for `tx.confirmations` under the receipt timeout.
    ///
    /// A mined transaction is returned as is, whatever its status; callers check it.
    pub async fn send_transaction(
        &self,
        tx: MetaTransaction,
    ) -> Result<TransactionReceipt, TransferError> {
        let mut txr = TransactionRequest::default()
            .with_to(tx.to)
            .with_from(self.sender)
            .with_input(tx.calldata);
        if !self.eip1559 {
            let gas: u128 = self
                .inner
                .get_gas_price()
                .into_future()
                .instrument(tracing::info_span!("get_gas_price"))
                .await
                .map_err(|e| categorize_transport_error(e, "eth_gasPrice"))?;
            txr.set_gas_price(gas);
        }

        let pending_tx = match self.inner.send_transaction(txr).await {
            Ok(pending) => pending,
            Err(e) => {
                let error_str = format!("{e:?}");
                if error_str.contains("nonce too low") || error_str.contains("nonce too high") {
                    tracing::error!(
                        from = %self.sender,
                        error = %error_str,
                        "transaction rejected due to nonce mismatch"
                    );
                } else if error_str.contains("insufficient funds") {
                    tracing::error!(
                        from = %self.sender,
                        error = %error_str,
                        "sender cannot pay for gas"
                    );
                }
                return Err(categorize_transport_error(e, "send_transaction"));
            }
        };

        let tx_hash = *pending_tx.tx_hash();
        tracing::debug!(
            network = %self.network,
            %tx_hash,
            confirmations = tx.confirmations,
            receipt_timeout_secs = self.receipt_timeout.as_secs(),
            "transaction submitted, waiting for receipt"
        );

        pending_tx
            .with_required_confirmations(tx.confirmations)
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| receipt_error(tx_hash, e))
    }
}

/// Transaction parameters: target address, calldata, and required confirmations.
pub struct MetaTransaction {
    /// Target contract address.
    pub to: Address,
    /// Transaction calldata (encoded function call).
    pub calldata: Bytes,
    /// Number of block confirmations to wait for.
    pub confirmations: u64,
}

/// LINK (ERC-677) token handle sending through an [`EvmProvider`].
#[derive(Clone)]
pub struct LinkToken {
    address: Address,
    provider: Arc<EvmProvider>,
    confirmations: u64,
}

impl LinkToken {
    pub fn new(address: Address, provider: Arc<EvmProvider>, confirmations: u64) -> Self {
        Self {
            address,
            provider,
            confirmations,
        }
    }
}

impl FundingToken for LinkToken {
    fn address(&self) -> Address {
        self.address
    }

    fn sender(&self) -> Address {
        self.provider.sender()
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, TransferError> {
        let contract = ILinkToken::new(self.address, self.provider.inner().clone());
        contract
            .balanceOf(owner)
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_token_balance",
                token_contract = %self.address,
                owner = %owner,
                otel.kind = "client"
            ))
            .await
            .map_err(|e| categorize_transport_error(e, "balance query"))
    }

    async fn transfer_and_call(
        &self,
        to: Address,
        amount: U256,
        data: Bytes,
    ) -> Result<TransferReceipt, TransferError> {
        let calldata = transfer_and_call_calldata(to, amount, data);
        let receipt = self
            .provider
            .send_transaction(MetaTransaction {
                to: self.address,
                calldata,
                confirmations: self.confirmations,
            })
            .instrument(tracing::info_span!("call_transferAndCall",
                token = %self.address,
                from = %self.provider.sender(),
                to = %to,
                value = %amount,
                otel.kind = "client",
            ))
            .await?;

        if !receipt.status() {
            tracing::error!(
                to = %to,
                tx_hash = %receipt.transaction_hash,
                "transferAndCall reverted"
            );
            return Err(TransferError::Reverted {
                to,
                transaction_hash: receipt.transaction_hash,
            });
        }

        Ok(TransferReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            recipient: to,
            amount,
        })
    }
}

/// ABI-encoded `transferAndCall(to, amount, data)`.
pub fn transfer_and_call_calldata(to: Address, amount: U256, data: Bytes) -> Bytes {
    ILinkToken::transferAndCallCall {
        to,
        value: amount,
        data,
    }
    .abi_encode()
    .into()
}

/// Connects to the LINK token using the RPC endpoint and signer from the environment.
///
/// Nothing is read from the environment until [`TokenConnector::connect`] is called,
/// so runs that skip funding need no RPC or key.
#[derive(Debug, Clone, Default)]
pub struct EvmConnector {
    config: DeployerConfig,
}

impl EvmConnector {
    pub fn new(config: DeployerConfig) -> Self {
        Self { config }
    }
}

impl TokenConnector for EvmConnector {
    type Token = LinkToken;

    async fn connect(
        &self,
        network: &str,
        settings: &NetworkSettings,
        token: Address,
    ) -> Result<LinkToken, TransferError> {
        let rpc_url = from_env::rpc_url_from_env(network)?;
        let wallet = from_env::SignerType::from_env()?.make_evm_wallet()?;
        let provider = EvmProvider::try_new(
            wallet,
            &rpc_url,
            settings.eip1559,
            network,
            &self.config.transaction,
        )?;

        if let Some(expected) = settings.chain_id {
            provider.assert_chain_id(expected).await?;
        }
        if !provider.is_contract_deployed(token).await? {
            tracing::error!(network, %token, "no contract code at token address");
            return Err(TransferError::NoTokenCode(token));
        }

        Ok(LinkToken::new(
            token,
            Arc::new(provider),
            self.config.funding.confirmations,
        ))
    }
}

/// Categorize transport/RPC errors.
///
/// Distinguishes between:
/// - Network/connection errors (DNS, TCP, timeouts) -> RpcProvider
/// - Everything else (reverts, rejected transactions) -> ContractCall
fn categorize_transport_error(e: impl std::fmt::Debug, context: &str) -> TransferError {
    let err_str = format!("{:?}", e);

    if err_str.contains("Connection refused")
        || err_str.contains("Connection reset")
        || err_str.contains("No route to host")
        || err_str.contains("timeout")
        || err_str.contains("Timeout")
        || err_str.contains("dns error")
    {
        tracing::error!("{context}: RPC connection error: {err_str}");
        TransferError::RpcProvider(format!("{context}: Connection error"))
    } else {
        tracing::error!("{context}: Contract call failed: {err_str}");
        TransferError::ContractCall(format!("{context}: {err_str}"))
    }
}

/// The transaction was broadcast but its receipt never arrived. The hash is kept so the
/// operator can look the transfer up.
fn receipt_error(transaction_hash: B256, e: impl std::fmt::Debug) -> TransferError {
    let reason = format!("{e:?}");
    tracing::error!(%transaction_hash, %reason, "transaction submitted, receipt not received");
    TransferError::ReceiptUnavailable {
        transaction_hash,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::AggregatorMode;
    use alloy::primitives::address;
    use alloy::signers::local::PrivateKeySigner;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn dev_wallet() -> EthereumWallet {
        let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();
        EthereumWallet::from(signer)
    }

    #[test]
    fn test_transfer_and_call_selector() {
        assert_eq!(
            ILinkToken::transferAndCallCall::SELECTOR,
            [0x40, 0x00, 0xae, 0xa0]
        );
    }

    #[test]
    fn test_transfer_and_call_calldata_with_empty_payload() {
        let to = address!("0x1111111111111111111111111111111111111111");
        let amount = U256::from(1_000_000_000_000_000_000u128);
        let calldata = transfer_and_call_calldata(to, amount, Bytes::new());

        // selector + address + amount + offset + length (payload is empty)
        assert_eq!(calldata.len(), 4 + 32 * 4);
        let decoded = ILinkToken::transferAndCallCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.value, amount);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_categorize_transport_error() {
        assert!(matches!(
            categorize_transport_error("error sending request: Connection refused", "send"),
            TransferError::RpcProvider(_)
        ));
        assert!(matches!(
            categorize_transport_error("request Timeout", "get_receipt"),
            TransferError::RpcProvider(_)
        ));
        let err = categorize_transport_error("execution reverted", "send_transaction");
        assert!(matches!(err, TransferError::ContractCall(ref msg) if msg.contains("execution reverted")));
    }

    #[test]
    fn test_receipt_timeout_keeps_transaction_hash() {
        let hash = B256::repeat_byte(0xab);
        let err = receipt_error(hash, "TxWatcher(Timeout)");
        assert!(matches!(
            err,
            TransferError::ReceiptUnavailable { transaction_hash, ref reason }
                if transaction_hash == hash && reason.contains("Timeout")
        ));
        assert!(err.to_string().contains("0xabab"));
    }

    #[test]
    fn test_provider_rejects_invalid_url() {
        let result = EvmProvider::try_new(
            dev_wallet(),
            "not a url",
            true,
            "ethereum",
            &TransactionConfig::default(),
        );
        assert!(matches!(result, Err(TransferError::RpcProvider(_))));
    }

    #[test]
    fn test_provider_uses_wallet_signer() {
        let provider = EvmProvider::try_new(
            dev_wallet(),
            "http://127.0.0.1:8545",
            false,
            "ethereum",
            &TransactionConfig::default(),
        )
        .unwrap();
        assert_eq!(
            provider.sender(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[tokio::test]
    async fn test_connector_requires_rpc_url() {
        let connector = EvmConnector::default();
        let settings = NetworkSettings {
            mode: AggregatorMode::Full,
            chain_id: None,
            eip1559: true,
            link_token: None,
        };
        let result = connector
            .connect(
                "aggregator-funding-no-rpc",
                &settings,
                address!("0x514910771AF9Ca656af840dff83E8264EcF986CA"),
            )
            .await;
        assert!(matches!(result, Err(TransferError::RpcProvider(ref msg)) if msg.contains("RPC_URL_AGGREGATOR_FUNDING_NO_RPC")));
    }
}
