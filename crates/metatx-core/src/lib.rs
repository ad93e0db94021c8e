//! Meta-transaction execution core.
//!
//! [`executor`] drives one contract call through the sign-then-relay protocol
//! and reports the outcome through an observable state machine. [`direct`]
//! is the fallback for contracts without forwarder support: an ordinary
//! wallet-signed transaction submitted straight to the chain. [`actions`]
//! wraps both in typed helpers for the escrow protocol's contracts.

pub mod actions;
pub mod direct;
pub mod executor;

pub use direct::{DirectWriteError, DirectWritePhase, DirectWriteReceipt, DirectWriter};
pub use executor::{ExecutorConfig, MetaTxExecutor};
