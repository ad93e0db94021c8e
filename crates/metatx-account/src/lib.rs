//! The wallet seam for the meta-transaction pipeline.
//!
//! The executor never touches key material. It resolves the current signer
//! address and requests typed-data signatures through the [`SigningAuthority`]
//! trait, so wallets and test doubles can be substituted freely.

use alloy::{
	primitives::{Address, Signature},
	sol_types::Eip712Domain,
};
use async_trait::async_trait;
use metatx_types::ForwardRequest;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalSigner;

/// Errors surfaced by a signing authority.
#[derive(Debug, Error)]
pub enum SignerError {
	/// The user declined the signing prompt.
	#[error("Signature rejected: {0}")]
	Rejected(String),
	/// Wallet-level failure while producing the signature.
	#[error("Signing failed: {0}")]
	Failed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// A wallet capable of producing EIP-712 signatures over forward requests.
#[async_trait]
pub trait SigningAuthority: Send + Sync {
	/// The currently connected signer address, if any. `None` means no
	/// wallet is connected and execution must not start.
	fn address(&self) -> Option<Address>;

	/// Signs the request as typed data under the given domain.
	async fn sign_forward_request(
		&self,
		request: &ForwardRequest,
		domain: &Eip712Domain,
	) -> Result<Signature, SignerError>;
}
