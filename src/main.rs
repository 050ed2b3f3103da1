//! Aggregator funding CLI.
//!
//! Runs the funding step once for one network, the way a deployment harness would:
//!
//! - Loads `.env`, then settings from `config.toml`, `networks.toml` and the JSON
//!   address book of deployed contracts (`deployments.json`).
//! - Connects to `RPC_URL_<NETWORK>` with the key in `EVM_PRIVATE_KEY`, only when
//!   the network is actually funded.
//! - Exits non-zero if the step fails.

use aggregator_funding::chain::evm::EvmConnector;
use aggregator_funding::config::DeployerConfig;
use aggregator_funding::context::DeploymentContext;
use aggregator_funding::funding::{FundingOutcome, FundingStep};
use aggregator_funding::networks::{NetworkConfig, NetworkRegistry};
use aggregator_funding::telemetry::Telemetry;
use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;

/// Fund the Full and Light aggregators with one LINK each
#[derive(Parser, Debug)]
#[command(name = "aggregator-funding")]
#[command(about = "Send one LINK to each deployed aggregator via transferAndCall")]
struct Cli {
    /// Network to fund (key in the networks file; "test" always skips)
    #[arg(long, env = "NETWORK")]
    network: String,

    /// Per-network settings (aggregator type, chain id, LINK address)
    #[arg(long, env = "NETWORKS_FILE", default_value = "networks.toml")]
    networks: PathBuf,

    /// JSON address book of deployed contracts
    #[arg(long, env = "DEPLOYMENTS_FILE", default_value = "deployments.json")]
    deployments: PathBuf,

    /// Deployer settings (timeouts, confirmations, balance check)
    #[arg(long, env = "CONFIG_FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let cli = Cli::parse();

    let config = DeployerConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    // A missing file leaves the network unknown, which the step reports itself
    let networks = if cli.networks.exists() {
        NetworkRegistry::from_file(&cli.networks)?
    } else {
        tracing::warn!(path = %cli.networks.display(), "networks file not found");
        NetworkRegistry::new(NetworkConfig::default())?
    };

    let context = if cli.deployments.exists() {
        DeploymentContext::from_file(cli.network.clone(), &cli.deployments)?
    } else {
        tracing::warn!(path = %cli.deployments.display(), "deployments file not found");
        DeploymentContext::new(cli.network.clone())
    };

    let step = FundingStep::new(
        networks,
        EvmConnector::new(config.clone()),
        config.funding.clone(),
    );

    match step.run(&context).await {
        Ok(FundingOutcome::Skipped(reason)) => {
            tracing::info!(network = %cli.network, ?reason, "aggregator funding skipped");
            Ok(())
        }
        Ok(FundingOutcome::Funded(receipts)) => {
            for receipt in &receipts {
                println!(
                    "funded {} with {} (tx {})",
                    receipt.recipient, receipt.amount, receipt.transaction_hash
                );
            }
            tracing::info!(network = %cli.network, transfers = receipts.len(), "aggregator funding complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(network = %cli.network, error = %e, "aggregator funding failed");
            Err(e).context("aggregator funding failed")
        }
    }
}
