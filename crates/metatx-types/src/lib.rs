//! Shared types for the escrow meta-transaction pipeline.
//!
//! This crate defines the forward-request schema signed by users and executed
//! by the trusted forwarder, the wire payloads exchanged with the relayer
//! service, and the execution lifecycle state machine observed by callers.

pub mod errors;
pub mod request;
pub mod state;

pub use errors::{CallEncodeError, MetaTxError};
pub use request::{
	encode_call, ForwardRequest, MetaTxParams, SignedForwardRequest, DEADLINE_SECS, DEFAULT_GAS,
};
pub use state::{ExecutionState, MetaTxStatus};
