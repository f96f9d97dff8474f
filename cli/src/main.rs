// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # vetx
//!
//! Entry point for the `vetx` binary. Parses CLI arguments, loads settings,
//! initializes logging and dispatches to a subcommand:
//!
//! - `encode`: validate a JSON intent, print signing hash and encoding
//! - `decode`: decode raw bytes into JSON
//! - `send`: build, sign and submit a transaction to a Thor node
//! - `address`: print the address of the configured key
//! - `version`: print build version information

mod cli;
mod client;
mod logging;
mod settings;

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::signal;

use vetx_protocol::config::{network_name, PROTOCOL_VERSION};
use vetx_protocol::transaction::types::chain_tag_from_genesis;
use vetx_protocol::transaction::{
    compute_signing_hash, encode_unsigned, intrinsic_gas, BlockRef, Clause, IntentBuilder,
    LocalSigner, RawTransaction, SigningProvider, TransactionIntent, TxBody, Validator,
};
use vetx_protocol::transport::{send_transaction, NodeTransport};

use cli::{Commands, VetxCli};
use client::ThorClient;
use settings::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = VetxCli::parse();
    logging::init_logging("vetx=info,vetx_protocol=info", cli.log_format);

    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load settings")?;
    config.apply_overrides(cli.network.as_deref(), cli.node_url.as_deref())?;

    match cli.command {
        Commands::Encode(args) => encode(&config, args),
        Commands::Decode(args) => decode(args),
        Commands::Send(args) => send(&config, args).await,
        Commands::Address(args) => {
            let signer = load_signer(&args)?;
            println!("{}", signer.address());
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodeOutput {
    network: String,
    tx_type: &'static str,
    intrinsic_gas: u64,
    signing_hash: B256,
    unsigned: Bytes,
}

fn encode(config: &CliConfig, args: cli::EncodeArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.intent)
        .with_context(|| format!("failed to read {}", args.intent.display()))?;
    let draft: TransactionIntent = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse intent in {}", args.intent.display()))?;

    let validator = Validator::new(config.network.clone());
    let validated = validator.validate(&draft)?;

    let output = EncodeOutput {
        network: config.network.name.clone(),
        tx_type: tx_type_name(&validated),
        intrinsic_gas: validated.intrinsic_gas(&config.network.gas),
        signing_hash: compute_signing_hash(&validated),
        unsigned: encode_unsigned(&validated),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodeOutput<'a> {
    network: String,
    tx_type: &'static str,
    signing_hash: B256,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delegator: Option<Address>,
    body: &'a TxBody,
}

fn decode(args: cli::DecodeArgs) -> Result<()> {
    let trimmed = args.raw.trim();
    let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .context("raw transaction is not valid hex")?;
    let raw = RawTransaction::decode(&bytes)?;

    let body = raw.body();
    let mut output = DecodeOutput {
        network: network_name(body.chain_tag()),
        tx_type: tx_type_name(body),
        signing_hash: compute_signing_hash(body),
        id: None,
        origin: None,
        delegator: None,
        body,
    };
    if let RawTransaction::Signed(tx) = &raw {
        output.origin = Some(tx.origin().context("failed to recover origin")?);
        output.delegator = tx.delegator().context("failed to recover delegator")?;
        output.id = Some(tx.id()?);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// send
// ---------------------------------------------------------------------------

async fn send(config: &CliConfig, args: cli::SendArgs) -> Result<()> {
    let signer = load_signer(&args.key)?;
    let client = ThorClient::new(&config.node_url, config.request_timeout())?;
    let validator = Validator::new(config.network.clone());

    let genesis = client
        .genesis_block_id()
        .await
        .with_context(|| format!("failed to reach node at {}", config.node_url))?;
    let node_tag = chain_tag_from_genesis(&genesis);
    if node_tag != config.network.chain_tag {
        bail!(
            "node at {} serves chain tag 0x{:02x}, but the configured network ({}) expects 0x{:02x}",
            config.node_url,
            node_tag,
            config.network.name,
            config.network.chain_tag
        );
    }

    let data = match &args.data {
        Some(data) => {
            let trimmed = data.strip_prefix("0x").unwrap_or(data);
            Bytes::from(hex::decode(trimmed).context("--data is not valid hex")?)
        }
        None => Bytes::new(),
    };
    let clause = Clause::call(args.to, args.value, data);
    let gas = args
        .gas
        .unwrap_or_else(|| intrinsic_gas(&config.network.gas, std::slice::from_ref(&clause)));

    tracing::info!(
        from = %signer.address(),
        to = %args.to,
        value = %args.value,
        gas,
        node = %config.node_url,
        "sending transaction"
    );

    let chain_tag = config.network.chain_tag;
    let draft = |block_ref: BlockRef| {
        let mut builder = IntentBuilder::new(chain_tag)
            .block_ref(block_ref)
            .expiration(args.expiration)
            .clause(clause)
            .gas(gas);
        builder = match (args.max_fee, args.max_priority_fee) {
            (Some(max_fee), Some(priority)) => builder.dynamic_fee(max_fee, priority),
            _ => builder.gas_price_coef(args.gas_price_coef.unwrap_or(0)),
        };
        if let Some(dep) = args.depends_on {
            builder = builder.depends_on(dep);
        }
        builder.build()
    };

    tokio::select! {
        res = send_transaction(&client, &validator, draft, &signer) => {
            let id = res?;
            println!("{}", id);
            Ok(())
        }
        _ = signal::ctrl_c() => {
            bail!("interrupted before the node confirmed submission");
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_signer(args: &cli::KeyArgs) -> Result<LocalSigner> {
    LocalSigner::from_hex(&args.private_key).context("VETX_PRIVATE_KEY is not a valid secp256k1 key")
}

fn tx_type_name(body: &TxBody) -> &'static str {
    if body.fee().is_dynamic() {
        "dynamic-fee"
    } else {
        "legacy"
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("vetx      {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", PROTOCOL_VERSION);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
