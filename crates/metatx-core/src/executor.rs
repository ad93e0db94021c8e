//! The meta-transaction executor.
//!
//! Drives one contract call through encode → sign → relay and reports the
//! outcome through a [`watch`]-observable [`ExecutionState`]. All runtime
//! failures are routed into the `error` state; callers never handle them as
//! returned errors. The single outward error is call encoding, which is a
//! caller bug and rejected before any state change or network activity.

use alloy::primitives::{aliases::U48, Address, Bytes, U256};
use metatx_account::{SignerError, SigningAuthority};
use metatx_relayer::{RelayerClient, RelayerError};
use metatx_types::{
	ExecutionState, ForwardRequest, MetaTxError, MetaTxParams, SignedForwardRequest,
	CallEncodeError, DEADLINE_SECS, DEFAULT_GAS,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Policy knobs for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
	/// Gas budget used when the caller supplies no override.
	pub default_gas: u64,
	/// Seconds from signing until the request's deadline.
	pub deadline_secs: u64,
	/// Upper bound on the relay submission call. `None` waits indefinitely,
	/// matching the relayer's own lack of a timeout.
	pub relay_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		Self {
			default_gas: DEFAULT_GAS,
			deadline_secs: DEADLINE_SECS,
			relay_timeout: None,
		}
	}
}

/// Executes contract calls via the sign-then-relay protocol.
///
/// Owns the [`ExecutionState`] for its invocations exclusively; callers read
/// it through [`subscribe`](Self::subscribe) and trigger
/// [`execute`](Self::execute) / [`reset`](Self::reset). Concurrent `execute`
/// calls on one executor are not supported; use one executor per in-flight
/// action.
pub struct MetaTxExecutor {
	signer: Arc<dyn SigningAuthority>,
	relayer: RelayerClient,
	config: ExecutorConfig,
	state: watch::Sender<ExecutionState>,
}

impl MetaTxExecutor {
	pub fn new(signer: Arc<dyn SigningAuthority>, relayer: RelayerClient) -> Self {
		Self::with_config(signer, relayer, ExecutorConfig::default())
	}

	pub fn with_config(
		signer: Arc<dyn SigningAuthority>,
		relayer: RelayerClient,
		config: ExecutorConfig,
	) -> Self {
		let (state, _) = watch::channel(ExecutionState::idle());
		Self {
			signer,
			relayer,
			config,
			state,
		}
	}

	/// Status stream for the current invocation.
	pub fn subscribe(&self) -> watch::Receiver<ExecutionState> {
		self.state.subscribe()
	}

	/// Snapshot of the current state.
	pub fn state(&self) -> ExecutionState {
		self.state.borrow().clone()
	}

	/// Returns the invocation to `idle`, clearing hash and error. Valid from
	/// any state and idempotent. An in-flight relayer call is not aborted.
	pub fn reset(&self) {
		self.state.send_modify(|state| *state = state.clone().reset());
	}

	/// Drives one call through the sign-then-relay protocol.
	///
	/// Resolves with the relayed transaction hash on success and `None` on
	/// failure; failures are observable only through the state stream. The
	/// `Err` case covers malformed call arguments only.
	pub async fn execute(
		&self,
		params: MetaTxParams,
	) -> Result<Option<String>, CallEncodeError> {
		// No connected wallet trumps everything else, including bad arguments.
		let Some(from) = self.signer.address() else {
			self.state
				.send_modify(|state| *state = state.clone().reset().fail(&MetaTxError::NoWallet));
			return Ok(None);
		};

		// Caller bug, not a runtime condition: reject before touching state.
		let data = params.encode()?;

		self.state
			.send_modify(|state| *state = state.clone().reset().begin_signing());

		match self.run(from, &params, data).await {
			Ok(tx_hash) => {
				info!(%from, tx_hash = %tx_hash, function = %params.function, "Meta-transaction relayed");
				self.state
					.send_modify(|state| *state = state.clone().succeed(tx_hash.clone()));
				Ok(Some(tx_hash))
			}
			Err(e) => {
				warn!(%from, function = %params.function, error = %e, "Meta-transaction failed");
				self.state.send_modify(|state| *state = state.clone().fail(&e));
				Ok(None)
			}
		}
	}

	async fn run(
		&self,
		from: Address,
		params: &MetaTxParams,
		data: Bytes,
	) -> Result<String, MetaTxError> {
		// Domain and nonce are independent fetches; both must land before
		// the message can be built.
		let (domain, nonce) =
			tokio::try_join!(self.relayer.domain(), self.relayer.nonce(from))
				.map_err(relayer_error)?;
		debug!(%nonce, chain_id = domain.chain_id, "Fetched signing domain and nonce");

		let deadline = unix_now() + self.config.deadline_secs;
		let gas = params.gas.unwrap_or(self.config.default_gas);

		let request = ForwardRequest {
			from,
			to: params.to,
			value: U256::ZERO,
			gas: U256::from(gas),
			nonce,
			deadline: U48::from(deadline),
			data,
		};

		let signature = self
			.signer
			.sign_forward_request(&request, &domain.to_eip712())
			.await
			.map_err(|e| match e {
				SignerError::Rejected(m) => MetaTxError::SigningRejected(m),
				other => MetaTxError::SigningFailed(other.to_string()),
			})?;

		self.state
			.send_modify(|state| *state = state.clone().begin_relaying());

		let payload = SignedForwardRequest::new(&request, &signature);
		let submit = self.relayer.relay(&payload);
		let result = match self.config.relay_timeout {
			Some(limit) => tokio::time::timeout(limit, submit).await.map_err(|_| {
				MetaTxError::RelayerUnavailable(format!(
					"relay submission timed out after {}s",
					limit.as_secs_f64()
				))
			})?,
			None => submit.await,
		};

		result.map_err(relayer_error)
	}
}

fn relayer_error(e: RelayerError) -> MetaTxError {
	match e {
		RelayerError::Unavailable(m) => MetaTxError::RelayerUnavailable(m),
		RelayerError::Rejected(m) => MetaTxError::RelayRejected(m),
	}
}

fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_secs()
}
