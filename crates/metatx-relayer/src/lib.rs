//! Typed client for the relayer's HTTP surface.
//!
//! The relayer exposes four JSON endpoints: the EIP-712 signing domain, the
//! per-signer forwarder nonce, signed-request submission, and a diagnostic
//! info endpoint. Each call is one round trip with no retry and no internal
//! timeout; callers treat any failure as terminal for the invocation.

use alloy::{
	primitives::{Address, U256},
	sol_types::Eip712Domain,
};
use metatx_types::SignedForwardRequest;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the relayer client.
#[derive(Debug, Error)]
pub enum RelayerError {
	/// Transport-level failure: unreachable host, non-JSON body, and the like.
	#[error("Relayer unreachable: {0}")]
	Unavailable(String),
	/// The relayer answered but declared failure.
	#[error("{0}")]
	Rejected(String),
}

/// Signing-domain descriptor returned by `GET /api/domain`.
///
/// Fetched per execution rather than hardcoded; the verifying contract
/// address can change between deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerDomain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	pub verifying_contract: Address,
}

impl RelayerDomain {
	/// Converts into the Alloy domain used for typed-data signing.
	pub fn to_eip712(&self) -> Eip712Domain {
		Eip712Domain::new(
			Some(self.name.clone().into()),
			Some(self.version.clone().into()),
			Some(U256::from(self.chain_id)),
			Some(self.verifying_contract),
			None,
		)
	}
}

/// Diagnostic snapshot of the relayer's own account from `GET /api/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayerInfo {
	pub address: Address,
	pub balance: String,
	pub nonce: u64,
}

#[derive(Deserialize)]
struct DomainEnvelope {
	success: bool,
	domain: Option<RelayerDomain>,
	error: Option<String>,
}

#[derive(Deserialize)]
struct NonceEnvelope {
	success: bool,
	nonce: Option<String>,
	error: Option<String>,
}

#[derive(Deserialize)]
struct RelayEnvelope {
	success: bool,
	#[serde(rename = "txHash")]
	tx_hash: Option<String>,
	error: Option<String>,
}

#[derive(Deserialize)]
struct InfoEnvelope {
	success: bool,
	relayer: Option<RelayerInfo>,
	error: Option<String>,
}

/// Thin typed access to the relayer endpoints.
#[derive(Debug, Clone)]
pub struct RelayerClient {
	http: reqwest::Client,
	base_url: String,
}

impl RelayerClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	/// Fetches the current EIP-712 signing domain.
	pub async fn domain(&self) -> Result<RelayerDomain, RelayerError> {
		let envelope: DomainEnvelope = self.get("/api/domain").await?;
		if !envelope.success {
			return Err(RelayerError::Rejected(
				envelope
					.error
					.unwrap_or_else(|| "Failed to get domain".to_string()),
			));
		}
		envelope
			.domain
			.ok_or_else(|| RelayerError::Rejected("Domain missing from response".to_string()))
	}

	/// Fetches the signer's current forwarder nonce.
	pub async fn nonce(&self, address: Address) -> Result<U256, RelayerError> {
		let envelope: NonceEnvelope = self.get(&format!("/api/nonce/{}", address)).await?;
		if !envelope.success {
			return Err(RelayerError::Rejected(
				envelope
					.error
					.unwrap_or_else(|| "Failed to get nonce".to_string()),
			));
		}
		let nonce = envelope
			.nonce
			.ok_or_else(|| RelayerError::Rejected("Nonce missing from response".to_string()))?;
		nonce
			.parse::<U256>()
			.map_err(|e| RelayerError::Rejected(format!("Invalid nonce in response: {}", e)))
	}

	/// Submits a signed forward request for on-chain execution. The relayer
	/// broadcasts, waits for inclusion, and returns the transaction hash.
	pub async fn relay(&self, request: &SignedForwardRequest) -> Result<String, RelayerError> {
		let url = format!("{}/api/relay", self.base_url);
		debug!(to = %request.to, "Submitting forward request to relayer");

		let response = self
			.http
			.post(&url)
			.json(request)
			.send()
			.await
			.map_err(|e| RelayerError::Unavailable(e.to_string()))?;
		let envelope: RelayEnvelope = response
			.json()
			.await
			.map_err(|e| RelayerError::Unavailable(e.to_string()))?;

		if !envelope.success {
			return Err(RelayerError::Rejected(
				envelope.error.unwrap_or_else(|| "Relay failed".to_string()),
			));
		}
		envelope
			.tx_hash
			.ok_or_else(|| RelayerError::Rejected("Transaction hash missing from response".to_string()))
	}

	/// Fetches the relayer's own address, balance, and nonce. Diagnostic
	/// only; the executor never calls this.
	pub async fn info(&self) -> Result<RelayerInfo, RelayerError> {
		let envelope: InfoEnvelope = self.get("/api/info").await?;
		if !envelope.success {
			return Err(RelayerError::Rejected(
				envelope
					.error
					.unwrap_or_else(|| "Failed to get relayer info".to_string()),
			));
		}
		envelope
			.relayer
			.ok_or_else(|| RelayerError::Rejected("Relayer info missing from response".to_string()))
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RelayerError> {
		let url = format!("{}{}", self.base_url, path);
		let response = self
			.http
			.get(&url)
			.send()
			.await
			.map_err(|e| RelayerError::Unavailable(e.to_string()))?;
		response
			.json::<T>()
			.await
			.map_err(|e| RelayerError::Unavailable(e.to_string()))
	}
}
