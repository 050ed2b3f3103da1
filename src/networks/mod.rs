//! Per-network deployment settings
//!
//! Settings come from `networks.toml`: one table per network name with the
//! aggregator mode and where the LINK token lives, plus a shared token
//! definition. Token addresses can be hardcoded or read from environment
//! variables with `${ENV_VAR}`.

pub mod config;
pub mod registry;

pub use config::{AggregatorMode, NetworkConfig, NetworkSettings, TokenDefinition};
pub use registry::NetworkRegistry;
