//! Forward-request construction and call encoding.

use crate::errors::CallEncodeError;
use alloy::{
	dyn_abi::{DynSolValue, JsonAbiExt},
	json_abi::JsonAbi,
	primitives::{Address, Bytes, Signature},
	sol,
};
use serde::{Deserialize, Serialize};

/// Default execution gas budget for the inner call when the caller supplies
/// no override.
pub const DEFAULT_GAS: u64 = 500_000;

/// Seconds from signing until a forward request expires.
pub const DEADLINE_SECS: u64 = 3600;

sol! {
	/// EIP-712 record the user signs and the forwarder executes.
	///
	/// Field order and types must match the forwarder contract's own
	/// definition bit-for-bit; any drift makes every signature invalid.
	#[derive(Debug)]
	struct ForwardRequest {
		address from;
		address to;
		uint256 value;
		uint256 gas;
		uint256 nonce;
		uint48 deadline;
		bytes data;
	}
}

/// Wire form of a signed request, as accepted by `POST /api/relay`.
///
/// Numeric fields travel as decimal strings. The nonce is intentionally
/// absent: the relayer reads the current value from the forwarder itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedForwardRequest {
	pub from: Address,
	pub to: Address,
	pub value: String,
	pub gas: String,
	pub deadline: String,
	pub data: Bytes,
	pub signature: Bytes,
}

impl SignedForwardRequest {
	/// Flattens a signed [`ForwardRequest`] into the relayer's wire shape.
	pub fn new(request: &ForwardRequest, signature: &Signature) -> Self {
		Self {
			from: request.from,
			to: request.to,
			value: request.value.to_string(),
			gas: request.gas.to_string(),
			deadline: request.deadline.to_string(),
			data: request.data.clone(),
			signature: Bytes::from(signature.as_bytes().to_vec()),
		}
	}
}

/// Caller-supplied intent for one meta-transaction.
///
/// Constructed per call and discarded once the invocation finishes.
#[derive(Debug, Clone)]
pub struct MetaTxParams {
	/// Target contract address.
	pub to: Address,
	/// Interface description of the target contract.
	pub abi: JsonAbi,
	/// Name of the function to call.
	pub function: String,
	/// Ordered call arguments.
	pub args: Vec<DynSolValue>,
	/// Execution gas budget override; [`DEFAULT_GAS`] when absent.
	pub gas: Option<u64>,
}

impl MetaTxParams {
	/// Encodes the call into selector-prefixed calldata.
	pub fn encode(&self) -> Result<Bytes, CallEncodeError> {
		encode_call(&self.abi, &self.function, &self.args)
	}
}

/// Encodes `function(args)` against the ABI into opaque calldata.
pub fn encode_call(
	abi: &JsonAbi,
	function: &str,
	args: &[DynSolValue],
) -> Result<Bytes, CallEncodeError> {
	let function = abi
		.function(function)
		.and_then(|overloads| overloads.first())
		.ok_or_else(|| CallEncodeError::UnknownFunction(function.to_string()))?;

	let data = function
		.abi_encode_input(args)
		.map_err(|e| CallEncodeError::BadArguments {
			function: function.name.clone(),
			reason: e.to_string(),
		})?;

	Ok(data.into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::{address, U256};

	fn token_abi() -> JsonAbi {
		JsonAbi::parse(["function approve(address spender, uint256 amount)"]).unwrap()
	}

	#[test]
	fn encode_call_prefixes_selector() {
		let abi = token_abi();
		let data = encode_call(
			&abi,
			"approve",
			&[
				DynSolValue::Address(address!("3a0edaFB40FA11E2f5316e6D64217AFf685a56ac")),
				DynSolValue::Uint(U256::from(1000u64), 256),
			],
		)
		.unwrap();

		// approve(address,uint256) selector followed by two words.
		assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
		assert_eq!(data.len(), 4 + 32 + 32);
	}

	#[test]
	fn encode_call_rejects_unknown_function() {
		let abi = token_abi();
		let err = encode_call(&abi, "transferFrom", &[]).unwrap_err();
		assert!(matches!(err, CallEncodeError::UnknownFunction(_)));
	}

	#[test]
	fn encode_call_rejects_wrong_arity() {
		let abi = token_abi();
		let err = encode_call(
			&abi,
			"approve",
			&[DynSolValue::Uint(U256::from(1u64), 256)],
		)
		.unwrap_err();
		assert!(matches!(err, CallEncodeError::BadArguments { .. }));
	}

	#[test]
	fn wire_payload_string_encodes_numeric_fields() {
		let request = ForwardRequest {
			from: address!("1111111111111111111111111111111111111111"),
			to: address!("2222222222222222222222222222222222222222"),
			value: U256::ZERO,
			gas: U256::from(DEFAULT_GAS),
			nonce: U256::from(5u64),
			deadline: alloy::primitives::aliases::U48::from(1_700_003_600u64),
			data: Bytes::from(vec![0xde, 0xad]),
		};
		let signature = Signature::new(U256::from(1u64), U256::from(2u64), false);

		let payload = SignedForwardRequest::new(&request, &signature);
		assert_eq!(payload.value, "0");
		assert_eq!(payload.gas, "500000");
		assert_eq!(payload.deadline, "1700003600");
		assert_eq!(payload.signature.len(), 65);

		let json = serde_json::to_value(&payload).unwrap();
		assert_eq!(json["data"], "0xdead");
		assert!(json["signature"].as_str().unwrap().starts_with("0x"));
		// The relayer re-reads the nonce; it never travels on the wire.
		assert!(json.get("nonce").is_none());
	}
}
