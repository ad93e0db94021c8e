//! Local private-key signing authority.
//!
//! Manages a private key in-process using Alloy's signer. Suitable for the
//! CLI and for tests where key management simplicity is preferred.

use crate::{SignerError, SigningAuthority};
use alloy::{
	primitives::{Address, Signature},
	signers::{local::PrivateKeySigner, Signer},
	sol_types::{Eip712Domain, SolStruct},
};
use async_trait::async_trait;
use metatx_types::ForwardRequest;

/// Signing authority backed by a locally held private key.
pub struct LocalSigner {
	signer: PrivateKeySigner,
}

impl LocalSigner {
	/// Creates a signer from a hex-encoded private key, with or without the
	/// 0x prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, SignerError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| SignerError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	/// Generates a throwaway key. Used by tests.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}
}

#[async_trait]
impl SigningAuthority for LocalSigner {
	fn address(&self) -> Option<Address> {
		Some(self.signer.address())
	}

	async fn sign_forward_request(
		&self,
		request: &ForwardRequest,
		domain: &Eip712Domain,
	) -> Result<Signature, SignerError> {
		let digest = request.eip712_signing_hash(domain);
		self.signer
			.sign_hash(&digest)
			.await
			.map_err(|e| SignerError::Failed(format!("Failed to sign typed data: {}", e)))
	}
}
