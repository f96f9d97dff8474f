//! # CLI Interface
//!
//! Defines the command-line argument structure for `vetx` using `clap`
//! derive. Five subcommands: `encode`, `decode`, `send`, `address`, and
//! `version`.

use alloy_primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// VeChainThor transaction tool.
///
/// Builds, validates, encodes, decodes and submits VeChainThor
/// transactions. Settings come from an optional TOML file, then environment
/// variables, then flags.
#[derive(Parser, Debug)]
#[command(
    name = "vetx",
    about = "VeChainThor transaction builder and validator",
    version,
    propagate_version = true
)]
pub struct VetxCli {
    /// Path to a TOML configuration file.
    #[arg(long, short = 'c', env = "VETX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Network preset: mainnet or testnet. Overrides the config file.
    #[arg(long, env = "VETX_NETWORK", global = true)]
    pub network: Option<String>,

    /// Base URL of the Thor node REST API. Overrides the config file.
    #[arg(long, env = "VETX_NODE_URL", global = true)]
    pub node_url: Option<String>,

    /// Log output format.
    #[arg(long, env = "VETX_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `vetx` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a JSON intent and print its signing hash and unsigned
    /// encoding.
    Encode(EncodeArgs),
    /// Decode a raw transaction (signed or unsigned) and print it as JSON.
    Decode(DecodeArgs),
    /// Build, sign and submit a single-clause transaction.
    Send(SendArgs),
    /// Print the address of the configured private key.
    Address(KeyArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `encode` subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to a JSON transaction intent.
    #[arg(long)]
    pub intent: PathBuf,
}

/// Arguments for the `decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded raw transaction, with or without `0x`.
    pub raw: String,
}

/// Secret key input shared by the signing subcommands.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded secp256k1 private key.
    ///
    /// Prefer the environment variable over the flag so the key stays out
    /// of shell history.
    #[arg(long, env = "VETX_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address.
    #[arg(long)]
    pub to: Address,

    /// Amount of VET in wei.
    #[arg(long, default_value_t = U256::ZERO)]
    pub value: U256,

    /// Hex-encoded call data.
    #[arg(long)]
    pub data: Option<String>,

    /// Gas limit. Defaults to the intrinsic gas of the clause.
    #[arg(long)]
    pub gas: Option<u64>,

    /// Legacy gas price coefficient (0-255).
    #[arg(long, conflicts_with_all = ["max_fee", "max_priority_fee"])]
    pub gas_price_coef: Option<u8>,

    /// Dynamic fee: maximum fee per gas, in wei.
    #[arg(long, requires = "max_priority_fee")]
    pub max_fee: Option<U256>,

    /// Dynamic fee: maximum priority fee per gas, in wei.
    #[arg(long, requires = "max_fee")]
    pub max_priority_fee: Option<U256>,

    /// Blocks after the reference block during which the transaction is
    /// valid.
    #[arg(long, default_value_t = vetx_protocol::config::DEFAULT_EXPIRATION)]
    pub expiration: u32,

    /// Id of a transaction that must be included first.
    #[arg(long)]
    pub depends_on: Option<B256>,

    #[command(flatten)]
    pub key: KeyArgs,
}
