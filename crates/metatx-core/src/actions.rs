//! Typed action wrappers for the escrow protocol contracts.
//!
//! These mirror the dashboard's action surfaces: the trade escrow order
//! lifecycle and vault creation run gasless through the executor, while the
//! Vault's investor operations (no forwarder support) go through the
//! direct-write path. Gas budgets are per-action, measured against the
//! deployed contracts.

use crate::direct::{DirectWriteError, DirectWriteReceipt, DirectWriter};
use crate::executor::MetaTxExecutor;
use alloy::{
	dyn_abi::DynSolValue,
	json_abi::JsonAbi,
	primitives::{keccak256, Address, B256, U256},
};
use metatx_types::{CallEncodeError, MetaTxParams};
use std::sync::Arc;

fn trade_escrow_abi() -> JsonAbi {
	JsonAbi::parse([
		"function createOrder(bytes32 orderId, address buyer, address vault, uint256 tokenId, uint256 amount, uint256 lockDuration)",
		"function fund(bytes32 orderId)",
		"function markShipped(bytes32 orderId, string docsUri, bytes32 docsHash)",
		"function raiseDispute(bytes32 orderId, bytes32 reasonHash)",
		"function release(bytes32 orderId)",
	])
	.expect("trade escrow ABI is well-formed")
}

fn vault_factory_abi() -> JsonAbi {
	JsonAbi::parse([
		"function createVault(uint256 tokenId, uint256 investorProfitShareBps)",
		"function createVaultWithCollateral(uint256 tokenId, uint256 collateralValue, uint256 investorProfitShareBps)",
	])
	.expect("vault factory ABI is well-formed")
}

fn vault_abi() -> JsonAbi {
	JsonAbi::parse([
		"function approveFundRelease(uint256 releaseId)",
		"function cancelFundRelease(uint256 releaseId)",
		"function requestFundRelease(uint256 tokenId, address[] vendors, uint256[] amounts)",
		"function investorDeposit(uint256 amount)",
		"function endVault()",
		"function liquidateToInvestor()",
	])
	.expect("vault ABI is well-formed")
}

fn erc20_abi() -> JsonAbi {
	JsonAbi::parse(["function approve(address spender, uint256 amount)"])
		.expect("ERC-20 ABI is well-formed")
}

fn erc721_abi() -> JsonAbi {
	JsonAbi::parse([
		"function approve(address to, uint256 tokenId)",
		"function setApprovalForAll(address operator, bool approved)",
	])
	.expect("ERC-721 ABI is well-formed")
}

/// Gasless order lifecycle against the trade escrow contract.
pub struct TradeEscrowActions {
	executor: Arc<MetaTxExecutor>,
	escrow: Address,
	payment_token: Address,
	escrow_abi: JsonAbi,
	token_abi: JsonAbi,
}

impl TradeEscrowActions {
	pub fn new(executor: Arc<MetaTxExecutor>, escrow: Address, payment_token: Address) -> Self {
		Self {
			executor,
			escrow,
			payment_token,
			escrow_abi: trade_escrow_abi(),
			token_abi: erc20_abi(),
		}
	}

	/// Approves the escrow to pull the buyer's payment tokens.
	pub async fn approve_payment(
		&self,
		amount: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.payment_token,
				abi: self.token_abi.clone(),
				function: "approve".to_string(),
				args: vec![
					DynSolValue::Address(self.escrow),
					DynSolValue::Uint(amount, 256),
				],
				gas: Some(100_000),
			})
			.await
	}

	#[allow(clippy::too_many_arguments)]
	pub async fn create_order(
		&self,
		order_id: B256,
		buyer: Address,
		vault: Address,
		token_id: U256,
		amount: U256,
		lock_duration: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.escrow,
				abi: self.escrow_abi.clone(),
				function: "createOrder".to_string(),
				args: vec![
					DynSolValue::FixedBytes(order_id, 32),
					DynSolValue::Address(buyer),
					DynSolValue::Address(vault),
					DynSolValue::Uint(token_id, 256),
					DynSolValue::Uint(amount, 256),
					DynSolValue::Uint(lock_duration, 256),
				],
				gas: Some(300_000),
			})
			.await
	}

	pub async fn fund(&self, order_id: B256) -> Result<Option<String>, CallEncodeError> {
		self.escrow_call("fund", vec![DynSolValue::FixedBytes(order_id, 32)], 200_000)
			.await
	}

	/// Records shipment with the documents URI and its digest.
	pub async fn mark_shipped(
		&self,
		order_id: B256,
		docs_uri: &str,
	) -> Result<Option<String>, CallEncodeError> {
		self.escrow_call(
			"markShipped",
			vec![
				DynSolValue::FixedBytes(order_id, 32),
				DynSolValue::String(docs_uri.to_string()),
				DynSolValue::FixedBytes(keccak256(docs_uri.as_bytes()), 32),
			],
			150_000,
		)
		.await
	}

	pub async fn raise_dispute(
		&self,
		order_id: B256,
		reason: &str,
	) -> Result<Option<String>, CallEncodeError> {
		self.escrow_call(
			"raiseDispute",
			vec![
				DynSolValue::FixedBytes(order_id, 32),
				DynSolValue::FixedBytes(keccak256(reason.as_bytes()), 32),
			],
			150_000,
		)
		.await
	}

	pub async fn release(&self, order_id: B256) -> Result<Option<String>, CallEncodeError> {
		self.escrow_call("release", vec![DynSolValue::FixedBytes(order_id, 32)], 300_000)
			.await
	}

	async fn escrow_call(
		&self,
		function: &str,
		args: Vec<DynSolValue>,
		gas: u64,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.escrow,
				abi: self.escrow_abi.clone(),
				function: function.to_string(),
				args,
				gas: Some(gas),
			})
			.await
	}
}

/// Gasless vault creation against the factory.
pub struct VaultFactoryActions {
	executor: Arc<MetaTxExecutor>,
	factory: Address,
	goods_token: Address,
	factory_abi: JsonAbi,
	goods_abi: JsonAbi,
}

impl VaultFactoryActions {
	pub fn new(executor: Arc<MetaTxExecutor>, factory: Address, goods_token: Address) -> Self {
		Self {
			executor,
			factory,
			goods_token,
			factory_abi: vault_factory_abi(),
			goods_abi: erc721_abi(),
		}
	}

	/// Approves the factory to take custody of the inventory NFT.
	pub async fn approve_goods(
		&self,
		token_id: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.goods_token,
				abi: self.goods_abi.clone(),
				function: "approve".to_string(),
				args: vec![
					DynSolValue::Address(self.factory),
					DynSolValue::Uint(token_id, 256),
				],
				gas: Some(100_000),
			})
			.await
	}

	pub async fn create_vault(
		&self,
		token_id: U256,
		investor_profit_share_bps: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.factory,
				abi: self.factory_abi.clone(),
				function: "createVault".to_string(),
				args: vec![
					DynSolValue::Uint(token_id, 256),
					DynSolValue::Uint(investor_profit_share_bps, 256),
				],
				gas: Some(800_000),
			})
			.await
	}

	/// Vault deployment needs ~3M gas.
	pub async fn create_vault_with_collateral(
		&self,
		token_id: U256,
		collateral_value: U256,
		investor_profit_share_bps: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.factory,
				abi: self.factory_abi.clone(),
				function: "createVaultWithCollateral".to_string(),
				args: vec![
					DynSolValue::Uint(token_id, 256),
					DynSolValue::Uint(collateral_value, 256),
					DynSolValue::Uint(investor_profit_share_bps, 256),
				],
				gas: Some(3_500_000),
			})
			.await
	}
}

/// Gasless fund-release management on a vault (the Vault supports ERC-2771).
pub struct VaultReleaseActions {
	executor: Arc<MetaTxExecutor>,
	vault: Address,
	abi: JsonAbi,
}

impl VaultReleaseActions {
	pub fn new(executor: Arc<MetaTxExecutor>, vault: Address) -> Self {
		Self {
			executor,
			vault,
			abi: vault_abi(),
		}
	}

	/// Requires 2-of-3 approvals from trader, investor, or admin to execute.
	pub async fn approve_fund_release(
		&self,
		release_id: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.vault_call("approveFundRelease", release_id, 300_000).await
	}

	pub async fn cancel_fund_release(
		&self,
		release_id: U256,
	) -> Result<Option<String>, CallEncodeError> {
		self.vault_call("cancelFundRelease", release_id, 100_000).await
	}

	async fn vault_call(
		&self,
		function: &str,
		release_id: U256,
		gas: u64,
	) -> Result<Option<String>, CallEncodeError> {
		self.executor
			.execute(MetaTxParams {
				to: self.vault,
				abi: self.abi.clone(),
				function: function.to_string(),
				args: vec![DynSolValue::Uint(release_id, 256)],
				gas: Some(gas),
			})
			.await
	}
}

/// Investor operations on a vault. These are not forwarder-aware, so they go
/// through the direct-write path and the caller pays gas.
pub struct VaultDirectActions {
	writer: DirectWriter,
	vault: Address,
	payment_token: Address,
	goods_token: Address,
	vault_abi: JsonAbi,
	token_abi: JsonAbi,
	goods_abi: JsonAbi,
}

impl VaultDirectActions {
	pub fn new(
		writer: DirectWriter,
		vault: Address,
		payment_token: Address,
		goods_token: Address,
	) -> Self {
		Self {
			writer,
			vault,
			payment_token,
			goods_token,
			vault_abi: vault_abi(),
			token_abi: erc20_abi(),
			goods_abi: erc721_abi(),
		}
	}

	pub async fn approve_payment(
		&self,
		amount: U256,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(
				self.payment_token,
				&self.token_abi,
				"approve",
				&[
					DynSolValue::Address(self.vault),
					DynSolValue::Uint(amount, 256),
				],
				U256::ZERO,
			)
			.await
	}

	pub async fn investor_deposit(
		&self,
		amount: U256,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(
				self.vault,
				&self.vault_abi,
				"investorDeposit",
				&[DynSolValue::Uint(amount, 256)],
				U256::ZERO,
			)
			.await
	}

	/// One-time approval letting the vault move the trader's inventory NFTs.
	pub async fn approve_vault_for_goods(
		&self,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(
				self.goods_token,
				&self.goods_abi,
				"setApprovalForAll",
				&[
					DynSolValue::Address(self.vault),
					DynSolValue::Bool(true),
				],
				U256::ZERO,
			)
			.await
	}

	pub async fn request_fund_release(
		&self,
		token_id: U256,
		vendors: Vec<Address>,
		amounts: Vec<U256>,
	) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(
				self.vault,
				&self.vault_abi,
				"requestFundRelease",
				&[
					DynSolValue::Uint(token_id, 256),
					DynSolValue::Array(vendors.into_iter().map(DynSolValue::Address).collect()),
					DynSolValue::Array(
						amounts
							.into_iter()
							.map(|amount| DynSolValue::Uint(amount, 256))
							.collect(),
					),
				],
				U256::ZERO,
			)
			.await
	}

	pub async fn end_vault(&self) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(self.vault, &self.vault_abi, "endVault", &[], U256::ZERO)
			.await
	}

	pub async fn liquidate_to_investor(&self) -> Result<DirectWriteReceipt, DirectWriteError> {
		self.writer
			.write(
				self.vault,
				&self.vault_abi,
				"liquidateToInvestor",
				&[],
				U256::ZERO,
			)
			.await
	}
}
