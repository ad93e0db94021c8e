//! Direct wallet-signed writes for contracts without forwarder support.
//!
//! Some targets (the Vault's investor operations) do not accept delegated
//! execution, so the caller pays gas itself: encode the call, submit an
//! ordinary transaction through the provider's wallet, then poll for the
//! receipt. No relay step is involved.

use alloy::{
	dyn_abi::DynSolValue,
	json_abi::JsonAbi,
	network::{EthereumWallet, TransactionBuilder},
	primitives::{Address, B256, U256},
	providers::{DynProvider, Provider, ProviderBuilder},
	rpc::types::TransactionRequest,
	signers::local::PrivateKeySigner,
};
use metatx_types::{encode_call, CallEncodeError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

/// Observable phase of a direct write. `Pending` while the submission is
/// outstanding, `Confirming` while polling for the receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectWritePhase {
	#[default]
	Idle,
	Pending,
	Confirming,
}

#[derive(Debug, Error)]
pub enum DirectWriteError {
	#[error("Call encoding failed: {0}")]
	Encode(#[from] CallEncodeError),
	#[error("Network error: {0}")]
	Network(String),
}

/// Outcome of a confirmed direct write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectWriteReceipt {
	pub tx_hash: B256,
	pub block_number: u64,
	pub success: bool,
}

/// Submits wallet-signed transactions and waits for their receipts.
pub struct DirectWriter {
	provider: DynProvider,
	phase: watch::Sender<DirectWritePhase>,
	poll_interval: Duration,
	confirm_timeout: Duration,
}

impl DirectWriter {
	/// Connects a provider whose wallet signs submissions with the given key.
	pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, DirectWriteError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DirectWriteError::Network(format!("Invalid RPC URL: {}", e)))?;
		let wallet = EthereumWallet::from(signer);
		let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

		Ok(Self::from_provider(provider.erased()))
	}

	/// Wraps an already-built provider. Used by tests and by callers that
	/// manage their own provider stack.
	pub fn from_provider(provider: DynProvider) -> Self {
		let (phase, _) = watch::channel(DirectWritePhase::Idle);
		Self {
			provider,
			phase,
			poll_interval: Duration::from_secs(2),
			confirm_timeout: Duration::from_secs(120),
		}
	}

	pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
		self.confirm_timeout = timeout;
		self
	}

	/// Phase stream for the current write.
	pub fn subscribe(&self) -> watch::Receiver<DirectWritePhase> {
		self.phase.subscribe()
	}

	/// Encodes and submits `function(args)` to the target, then polls until
	/// the receipt lands or the confirmation timeout elapses.
	pub async fn write(
		&self,
		to: Address,
		abi: &JsonAbi,
		function: &str,
		args: &[DynSolValue],
		value: U256,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		let data = encode_call(abi, function, args)?;

		self.phase.send_replace(DirectWritePhase::Pending);
		let request = TransactionRequest::default()
			.with_to(to)
			.with_value(value)
			.with_input(data);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| {
				self.phase.send_replace(DirectWritePhase::Idle);
				DirectWriteError::Network(format!("Failed to send transaction: {}", e))
			})?;
		let tx_hash = *pending.tx_hash();
		info!(%tx_hash, %function, "Submitted transaction");

		self.phase.send_replace(DirectWritePhase::Confirming);
		let result = self.wait_for_receipt(tx_hash).await;
		self.phase.send_replace(DirectWritePhase::Idle);
		result
	}

	async fn wait_for_receipt(
		&self,
		tx_hash: B256,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		let started = tokio::time::Instant::now();

		loop {
			if started.elapsed() > self.confirm_timeout {
				return Err(DirectWriteError::Network(format!(
					"Timeout waiting for receipt after {}s",
					self.confirm_timeout.as_secs()
				)));
			}

			match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => match receipt.block_number {
					Some(block_number) => {
						return Ok(DirectWriteReceipt {
							tx_hash,
							block_number,
							success: receipt.status(),
						});
					}
					// A receipt without a block is still pending.
					None => {
						debug!(%tx_hash, "Receipt not yet in a block");
						tokio::time::sleep(self.poll_interval).await;
					}
				},
				Ok(None) => {
					// Not yet mined.
					debug!(%tx_hash, "Receipt not available yet");
					tokio::time::sleep(self.poll_interval).await;
				}
				Err(e) => {
					return Err(DirectWriteError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				}
			}
		}
	}
}
