//! Aggregator funding step.
//!
//! Sends one whole LINK to each of the two aggregators deployed earlier in the run:
//! first `FullAggregator`, then `LightAggregator`, via `transferAndCall` with an empty
//! payload. Local `test` runs and networks running light aggregators are skipped.
//!
//! Failures are fatal and not compensated: if the first transfer fails the second is
//! never sent, and if the second fails the first stays funded.

use alloy::primitives::{Address, Bytes, U256};
use tracing::Instrument;

use crate::chain::{FundingToken, TokenConnector, TransferReceipt};
use crate::config::FundingConfig;
use crate::context::{DeploymentContext, FULL_AGGREGATOR, LIGHT_AGGREGATOR};
use crate::errors::{ConfigError, FundingError, TransferError};
use crate::networks::{AggregatorMode, NetworkRegistry};

/// Why the step did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The run targets the reserved `test` network.
    TestNetwork,
    /// The network is configured with light aggregators.
    LightAggregatorMode,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
    Skipped(SkipReason),
    /// Receipts of the two transfers, full aggregator first.
    Funded(Vec<TransferReceipt>),
}

/// The funding step, bound to its network settings and a way to reach the token.
pub struct FundingStep<C> {
    networks: NetworkRegistry,
    connector: C,
    settings: FundingConfig,
}

impl<C> FundingStep<C>
where
    C: TokenConnector,
{
    pub fn new(networks: NetworkRegistry, connector: C, settings: FundingConfig) -> Self {
        Self {
            networks,
            connector,
            settings,
        }
    }

    /// Run the step once for `context`.
    ///
    /// # Errors
    /// - [`ConfigError::UnknownNetwork`] if the network has no settings entry.
    /// - [`ConfigError::InvalidValue`] if the balance check cannot represent the total
    ///   to be sent.
    /// - [`TransferError`] if an aggregator or the token cannot be resolved, the balance is
    ///   short, or either transfer fails.
    pub async fn run(&self, context: &DeploymentContext) -> Result<FundingOutcome, FundingError> {
        let network = context.network.as_str();

        if context.is_test_network() {
            tracing::info!(network, "test network, skipping aggregator funding");
            return Ok(FundingOutcome::Skipped(SkipReason::TestNetwork));
        }

        let settings = self.networks.settings(network)?;
        if settings.mode == AggregatorMode::Light {
            tracing::info!(network, "light aggregator network, skipping aggregator funding");
            return Ok(FundingOutcome::Skipped(SkipReason::LightAggregatorMode));
        }

        let amount = self.networks.unit_amount();
        let recipients = [
            (FULL_AGGREGATOR, context.address_of(FULL_AGGREGATOR)?),
            (LIGHT_AGGREGATOR, context.address_of(LIGHT_AGGREGATOR)?),
        ];

        let token_address = self.networks.token_address(network)?;
        let token = self
            .connector
            .connect(network, settings, token_address)
            .await?;

        tracing::info!(
            network,
            token = %token.address(),
            symbol = %self.networks.token().symbol,
            sender = %token.sender(),
            %amount,
            "funding aggregators"
        );

        if self.settings.check_balance {
            let required = amount
                .checked_mul(U256::from(recipients.len()))
                .ok_or_else(|| ConfigError::InvalidValue {
                    scope: "token".to_string(),
                    field: "decimals".to_string(),
                    message: format!(
                        "{} transfers of {amount} overflow a 256-bit balance",
                        recipients.len()
                    ),
                })?;
            assert_enough_balance(&token, required).await?;
        }

        let mut receipts = Vec::with_capacity(recipients.len());
        for (name, recipient) in recipients {
            let receipt = token
                .transfer_and_call(recipient, amount, Bytes::new())
                .instrument(tracing::info_span!("fund_aggregator",
                    aggregator = name,
                    recipient = %recipient,
                ))
                .await?;
            tracing::info!(
                aggregator = name,
                recipient = %recipient,
                tx_hash = %receipt.transaction_hash,
                block = ?receipt.block_number,
                gas_used = receipt.gas_used,
                "aggregator funded"
            );
            receipts.push(receipt);
        }

        Ok(FundingOutcome::Funded(receipts))
    }
}

/// Fails with [`TransferError::InsufficientBalance`] if the token's sender holds less than `required`.
async fn assert_enough_balance<T: FundingToken>(
    token: &T,
    required: U256,
) -> Result<(), TransferError> {
    let sender: Address = token.sender();
    let balance = token.balance_of(sender).await?;
    if balance < required {
        tracing::error!(%sender, %balance, %required, "insufficient token balance");
        Err(TransferError::InsufficientBalance {
            sender,
            balance,
            required,
        })
    } else {
        Ok(())
    }
}
