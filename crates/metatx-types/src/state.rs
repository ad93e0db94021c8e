//! Execution lifecycle state machine.
//!
//! One [`ExecutionState`] value belongs to exactly one in-flight invocation.
//! Transitions are pure value-to-value functions so the lifecycle can be
//! exercised without an executor or any network collaborators.

use crate::errors::MetaTxError;
use serde::{Deserialize, Serialize};

/// Phase of a meta-transaction invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaTxStatus {
	#[default]
	Idle,
	Signing,
	Relaying,
	Success,
	Error,
}

/// Lifecycle record for one invocation: current phase plus the resulting
/// transaction hash or error description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionState {
	pub status: MetaTxStatus,
	pub tx_hash: Option<String>,
	pub error: Option<String>,
}

impl ExecutionState {
	/// Fresh state with no recorded hash or error.
	pub fn idle() -> Self {
		Self::default()
	}

	/// `idle` → `signing`: the call is encoded and the wallet prompt is up.
	pub fn begin_signing(self) -> Self {
		Self {
			status: MetaTxStatus::Signing,
			tx_hash: None,
			error: None,
		}
	}

	/// `signing` → `relaying`: signature obtained, submission outstanding.
	pub fn begin_relaying(self) -> Self {
		Self {
			status: MetaTxStatus::Relaying,
			..self
		}
	}

	/// Terminal success with the relayed transaction hash recorded.
	pub fn succeed(self, tx_hash: impl Into<String>) -> Self {
		Self {
			status: MetaTxStatus::Success,
			tx_hash: Some(tx_hash.into()),
			error: None,
		}
	}

	/// Terminal failure with the underlying message preserved.
	pub fn fail(self, error: &MetaTxError) -> Self {
		Self {
			status: MetaTxStatus::Error,
			tx_hash: None,
			error: Some(error.to_string()),
		}
	}

	/// Explicit return to `idle`, clearing hash and error. Valid from any
	/// state and idempotent.
	pub fn reset(self) -> Self {
		Self::default()
	}

	/// True while a signing prompt or relayer call is outstanding. Callers
	/// disable action triggers while this holds.
	pub fn is_in_flight(&self) -> bool {
		matches!(self.status, MetaTxStatus::Signing | MetaTxStatus::Relaying)
	}

	/// True once the invocation has settled either way.
	pub fn is_terminal(&self) -> bool {
		matches!(self.status, MetaTxStatus::Success | MetaTxStatus::Error)
	}

	/// Short status string for display.
	pub fn status_line(&self) -> String {
		match self.status {
			MetaTxStatus::Idle => "Idle".to_string(),
			MetaTxStatus::Signing => "Sign in wallet...".to_string(),
			MetaTxStatus::Relaying => "Relaying...".to_string(),
			MetaTxStatus::Success => {
				let hash = self.tx_hash.as_deref().unwrap_or("");
				let prefix: String = hash.chars().take(10).collect();
				format!("Success! {}...", prefix)
			}
			MetaTxStatus::Error => {
				format!("Error: {}", self.error.as_deref().unwrap_or("Unknown error"))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_path_visits_every_phase() {
		let state = ExecutionState::idle();
		assert_eq!(state.status, MetaTxStatus::Idle);

		let state = state.begin_signing();
		assert_eq!(state.status, MetaTxStatus::Signing);
		assert!(state.is_in_flight());

		let state = state.begin_relaying();
		assert_eq!(state.status, MetaTxStatus::Relaying);
		assert!(state.is_in_flight());

		let state = state.succeed("0xabc123");
		assert_eq!(state.status, MetaTxStatus::Success);
		assert!(state.is_terminal());
		assert_eq!(state.tx_hash.as_deref(), Some("0xabc123"));
		assert!(state.error.is_none());
	}

	#[test]
	fn failure_preserves_message_and_clears_hash() {
		let state = ExecutionState::idle()
			.begin_signing()
			.begin_relaying()
			.fail(&MetaTxError::RelayRejected("stale nonce".to_string()));

		assert_eq!(state.status, MetaTxStatus::Error);
		assert!(state.tx_hash.is_none());
		assert!(state.error.as_deref().unwrap().contains("stale nonce"));
	}

	#[test]
	fn reset_clears_from_any_state_idempotently() {
		for state in [
			ExecutionState::idle(),
			ExecutionState::idle().begin_signing(),
			ExecutionState::idle().begin_signing().begin_relaying(),
			ExecutionState::idle().begin_signing().succeed("0xabc"),
			ExecutionState::idle().fail(&MetaTxError::NoWallet),
		] {
			let once = state.clone().reset();
			assert_eq!(once, ExecutionState::idle());
			assert_eq!(once.clone().reset(), once);
		}
	}

	#[test]
	fn status_lines_match_display_contract() {
		assert_eq!(
			ExecutionState::idle().begin_signing().status_line(),
			"Sign in wallet..."
		);
		assert_eq!(
			ExecutionState::idle()
				.begin_signing()
				.begin_relaying()
				.status_line(),
			"Relaying..."
		);
		assert_eq!(
			ExecutionState::idle()
				.begin_signing()
				.succeed("0xabc123def456")
				.status_line(),
			"Success! 0xabc123de..."
		);
		assert_eq!(
			ExecutionState::idle().fail(&MetaTxError::NoWallet).status_line(),
			"Error: Wallet not connected"
		);
	}
}
