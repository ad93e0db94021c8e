//! Command-line action caller for the escrow meta-transaction pipeline.
//!
//! Each subcommand drives one contract action through the executor (or the
//! direct-write path for the Vault's investor operations) and renders the
//! status stream as it advances.

use alloy::primitives::{
	utils::parse_ether, Address, B256, U256,
};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use metatx_account::{LocalSigner, SigningAuthority};
use metatx_config::{Config, ConfigLoader};
use metatx_core::{
	actions::{TradeEscrowActions, VaultDirectActions, VaultFactoryActions, VaultReleaseActions},
	DirectWriter, ExecutorConfig, MetaTxExecutor,
};
use metatx_relayer::RelayerClient;
use metatx_types::MetaTxStatus;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "escrow-metatx")]
#[command(about = "Gasless action runner for the escrow protocol", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "METATX_LOG_LEVEL", default_value = "info")]
	log_level: String,

	/// Hex private key of the acting wallet.
	#[arg(long, env = "METATX_PRIVATE_KEY", hide_env_values = true)]
	private_key: Option<String>,
}

#[derive(Subcommand, Clone)]
enum Commands {
	/// Trade escrow order lifecycle (gasless)
	#[command(subcommand)]
	Order(OrderCommands),
	/// Vault creation and investor operations
	#[command(subcommand)]
	Vault(VaultCommands),
	/// Relayer diagnostics
	RelayerInfo,
	/// Validate the configuration file
	Validate,
}

#[derive(Subcommand, Clone)]
enum OrderCommands {
	/// Create a buyer-seller escrow order
	Create {
		order_id: B256,
		buyer: Address,
		vault: Address,
		token_id: U256,
		/// Payment amount in whole tokens
		amount: String,
		/// Lock duration in seconds
		lock_duration: U256,
	},
	/// Fund an order as the buyer
	Fund { order_id: B256 },
	/// Record shipment documents
	Ship { order_id: B256, docs_uri: String },
	/// Raise a dispute on a shipped order
	Dispute { order_id: B256, reason: String },
	/// Release escrowed funds to the seller
	Release { order_id: B256 },
}

#[derive(Subcommand, Clone)]
enum VaultCommands {
	/// Create a collateral-backed vault (gasless)
	Create {
		token_id: U256,
		profit_share_bps: U256,
		/// Collateral value in whole tokens; deploys with collateral when set
		#[arg(long)]
		collateral: Option<String>,
	},
	/// Deposit capital into a vault as an investor (direct write)
	Deposit {
		vault: Address,
		/// Amount in whole tokens
		amount: String,
	},
	/// Approve a pending fund release (gasless)
	ApproveRelease { vault: Address, release_id: U256 },
	/// Cancel a pending fund release (gasless)
	CancelRelease { vault: Address, release_id: U256 },
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	match cli.command.clone() {
		Commands::Order(command) => {
			let executor = build_executor(&cli, &config)?;
			let actions = TradeEscrowActions::new(
				executor.clone(),
				config.contracts.trade_escrow,
				config.contracts.idrp_token,
			);
			let result = match command {
				OrderCommands::Create {
					order_id,
					buyer,
					vault,
					token_id,
					amount,
					lock_duration,
				} => {
					let amount = parse_ether(&amount).context("Invalid amount")?;
					actions
						.create_order(order_id, buyer, vault, token_id, amount, lock_duration)
						.await
				}
				OrderCommands::Fund { order_id } => actions.fund(order_id).await,
				OrderCommands::Ship { order_id, docs_uri } => {
					actions.mark_shipped(order_id, &docs_uri).await
				}
				OrderCommands::Dispute { order_id, reason } => {
					actions.raise_dispute(order_id, &reason).await
				}
				OrderCommands::Release { order_id } => actions.release(order_id).await,
			};
			finish(&executor, result)
		}
		Commands::Vault(command) => run_vault_command(&cli, &config, command).await,
		Commands::RelayerInfo => {
			let relayer = RelayerClient::new(config.relayer.url.clone());
			let info = relayer.info().await.context("Failed to reach relayer")?;
			println!("Relayer address: {}", info.address);
			println!("Relayer balance: {}", info.balance);
			println!("Relayer nonce:   {}", info.nonce);
			Ok(())
		}
		Commands::Validate => {
			info!("Configuration is valid");
			info!("Relayer URL: {}", config.relayer.url);
			info!("Chain ID: {}", config.chain.chain_id);
			info!("Trade escrow: {}", config.contracts.trade_escrow);
			info!("Vault factory: {}", config.contracts.vault_factory);
			Ok(())
		}
	}
}

async fn run_vault_command(cli: &Cli, config: &Config, command: VaultCommands) -> Result<()> {
	match command {
		VaultCommands::Create {
			token_id,
			profit_share_bps,
			collateral,
		} => {
			let executor = build_executor(cli, config)?;
			let actions = VaultFactoryActions::new(
				executor.clone(),
				config.contracts.vault_factory,
				config.contracts.goods_token,
			);
			let result = match collateral {
				Some(collateral) => {
					let value = parse_ether(&collateral).context("Invalid collateral value")?;
					actions
						.create_vault_with_collateral(token_id, value, profit_share_bps)
						.await
				}
				None => actions.create_vault(token_id, profit_share_bps).await,
			};
			finish(&executor, result)
		}
		VaultCommands::Deposit { vault, amount } => {
			let amount = parse_ether(&amount).context("Invalid amount")?;
			let key = require_key(cli)?;
			let signer: PrivateKeySigner =
				key.parse().context("Invalid private key")?;
			let writer = DirectWriter::new(&config.chain.rpc_url, signer)
				.context("Failed to connect chain provider")?;
			let actions = VaultDirectActions::new(
				writer,
				vault,
				config.contracts.idrp_token,
				config.contracts.goods_token,
			);

			println!("Submitting deposit...");
			let receipt = actions
				.investor_deposit(amount)
				.await
				.context("Deposit failed")?;
			if !receipt.success {
				bail!("Deposit transaction reverted: {}", receipt.tx_hash);
			}
			println!(
				"Confirmed in block {}: {}",
				receipt.block_number, receipt.tx_hash
			);
			Ok(())
		}
		VaultCommands::ApproveRelease { vault, release_id } => {
			let executor = build_executor(cli, config)?;
			let actions = VaultReleaseActions::new(executor.clone(), vault);
			let result = actions.approve_fund_release(release_id).await;
			finish(&executor, result)
		}
		VaultCommands::CancelRelease { vault, release_id } => {
			let executor = build_executor(cli, config)?;
			let actions = VaultReleaseActions::new(executor.clone(), vault);
			let result = actions.cancel_fund_release(release_id).await;
			finish(&executor, result)
		}
	}
}

fn require_key(cli: &Cli) -> Result<&str> {
	cli.private_key
		.as_deref()
		.context("METATX_PRIVATE_KEY is required for this command")
}

fn build_executor(cli: &Cli, config: &Config) -> Result<Arc<MetaTxExecutor>> {
	let signer: Arc<dyn SigningAuthority> =
		Arc::new(LocalSigner::new(require_key(cli)?).context("Invalid private key")?);
	let relayer = RelayerClient::new(config.relayer.url.clone());
	let executor = MetaTxExecutor::with_config(
		signer,
		relayer,
		ExecutorConfig {
			default_gas: config.executor.default_gas,
			deadline_secs: config.executor.deadline_secs,
			relay_timeout: config.relayer.relay_timeout_secs.map(Duration::from_secs),
		},
	);

	let executor = Arc::new(executor);
	spawn_status_printer(&executor);
	Ok(executor)
}

/// Prints each status transition as the invocation advances.
fn spawn_status_printer(executor: &Arc<MetaTxExecutor>) {
	let mut rx = executor.subscribe();
	tokio::spawn(async move {
		while rx.changed().await.is_ok() {
			let state = rx.borrow().clone();
			if state.status != MetaTxStatus::Idle {
				println!("{}", state.status_line());
			}
		}
	});
}

/// Maps the terminal executor state to the process outcome.
fn finish(
	executor: &MetaTxExecutor,
	result: Result<Option<String>, metatx_types::CallEncodeError>,
) -> Result<()> {
	let outcome = result.context("Invalid call arguments")?;
	match outcome {
		Some(_) => Ok(()),
		None => {
			let state = executor.state();
			bail!(
				"{}",
				state.error.unwrap_or_else(|| "Unknown error".to_string())
			)
		}
	}
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
