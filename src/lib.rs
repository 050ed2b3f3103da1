//! Deployment step that funds the Full and Light aggregators with LINK.
//!
//! Once both aggregators and the LINK token are deployed on a network, the step sends
//! one whole LINK to each aggregator through ERC-677 `transferAndCall`, unless the run
//! targets the local `test` network or the network runs light aggregators only.
//!
//! ```no_run
//! use aggregator_funding::chain::evm::EvmConnector;
//! use aggregator_funding::config::DeployerConfig;
//! use aggregator_funding::context::DeploymentContext;
//! use aggregator_funding::funding::FundingStep;
//! use aggregator_funding::networks::NetworkRegistry;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeployerConfig::from_env()?;
//! let networks = NetworkRegistry::from_file("networks.toml")?;
//! let context = DeploymentContext::from_file("ethereum", "deployments.json")?;
//!
//! let step = FundingStep::new(networks, EvmConnector::new(config.clone()), config.funding);
//! let outcome = step.run(&context).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod context;
pub mod errors;
pub mod from_env;
pub mod funding;
pub mod networks;
pub mod telemetry;
