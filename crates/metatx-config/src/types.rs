//! Configuration type definitions.

use alloy::primitives::Address;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub relayer: RelayerConfig,
	pub chain: ChainConfig,
	pub contracts: ContractsConfig,
	#[serde(default)]
	pub executor: ExecutorSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayerConfig {
	/// Base URL of the relayer service.
	pub url: String,
	/// Upper bound on the relay submission call, in seconds. Absent means
	/// wait indefinitely.
	#[serde(default)]
	pub relay_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
	pub rpc_url: String,
	pub chain_id: u64,
}

/// Deployed contract addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
	pub idrp_token: Address,
	pub goods_token: Address,
	pub trade_escrow: Address,
	pub vault_factory: Address,
	pub goods_router: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
	pub default_gas: u64,
	pub deadline_secs: u64,
}

impl Default for ExecutorSettings {
	fn default() -> Self {
		Self {
			default_gas: 500_000,
			deadline_secs: 3600,
		}
	}
}
