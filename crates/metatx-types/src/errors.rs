//! Failure taxonomy for meta-transaction execution.

use thiserror::Error;

/// Errors that can occur while driving one meta-transaction invocation.
///
/// The executor converts all of these into the `error` state rather than
/// surfacing them to callers; the display strings here are what callers see.
#[derive(Debug, Error)]
pub enum MetaTxError {
	/// No signer address was resolvable; execution never started.
	#[error("Wallet not connected")]
	NoWallet,
	/// The user declined the typed-data signing prompt.
	#[error("Signature rejected: {0}")]
	SigningRejected(String),
	/// Wallet-level failure while producing the typed-data signature.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Transport-level failure reaching a relayer endpoint.
	#[error("Relayer unreachable: {0}")]
	RelayerUnavailable(String),
	/// The relayer responded but declared the submission a failure.
	#[error("Relay failed: {0}")]
	RelayRejected(String),
}

/// Errors raised when caller-supplied call parameters cannot be encoded.
///
/// Unlike [`MetaTxError`], these are treated as caller programming errors and
/// propagate out of `execute` before any state change or network activity.
#[derive(Debug, Error)]
pub enum CallEncodeError {
	#[error("Function not found in ABI: {0}")]
	UnknownFunction(String),
	#[error("Argument encoding failed for {function}: {reason}")]
	BadArguments { function: String, reason: String },
}
