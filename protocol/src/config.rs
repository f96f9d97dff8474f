//! # Protocol Configuration & Constants
//!
//! Every magic number the transaction format depends on lives here. If a
//! constant shows up hardcoded somewhere else, it belongs in this file.
//!
//! Constants are split into two kinds: format constants that are fixed by
//! the network (type markers, signature sizes) and per-network parameters
//! that a caller may want to override (chain tag, expiration bound, gas
//! schedule). The latter are gathered into [`NetworkConfig`].

use serde::{Deserialize, Serialize};

/// Library version, reported by tooling built on top of it.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Mainnet chain tag: the last byte of the mainnet genesis block id.
pub const CHAIN_TAG_MAINNET: u8 = 0x4a;

/// Testnet chain tag: the last byte of the testnet genesis block id.
pub const CHAIN_TAG_TESTNET: u8 = 0x27;

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Type marker prefixed to dynamic-fee transactions. Legacy transactions
/// carry no marker and start directly with an RLP list header.
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x51;

/// Smallest first byte of an RLP list header. Any leading byte at or above
/// this value identifies a legacy transaction.
pub const RLP_LIST_OFFSET: u8 = 0xc0;

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a block reference in bytes.
pub const BLOCK_REF_LENGTH: usize = 8;

/// Length of block ids, transaction ids and signing hashes.
pub const HASH_LENGTH: usize = 32;

/// Recoverable secp256k1 signature: `r || s || recovery_id`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Origin signature followed by the gas payer's signature.
pub const DELEGATED_SIGNATURE_LENGTH: usize = SIGNATURE_LENGTH * 2;

/// Reserved feature bit designating a separate gas payer.
pub const FEATURE_DELEGATION: u32 = 1;

// ---------------------------------------------------------------------------
// Expiration
// ---------------------------------------------------------------------------

/// Default upper bound on `expiration`, in blocks. At 10 seconds per block
/// this is two hours of replay window.
pub const DEFAULT_MAX_EXPIRATION: u32 = 720;

/// Expiration used by the CLI when none is given.
pub const DEFAULT_EXPIRATION: u32 = 32;

// ---------------------------------------------------------------------------
// Gas Schedule
// ---------------------------------------------------------------------------

/// Base cost charged to every transaction.
pub const TX_GAS: u64 = 5_000;

/// Cost of a clause with a recipient.
pub const CLAUSE_GAS: u64 = 16_000;

/// Cost of a clause without a recipient (contract deployment).
pub const CLAUSE_GAS_CONTRACT_CREATION: u64 = 48_000;

/// Cost per zero byte of clause data.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Cost per non-zero byte of clause data.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Decimal places of the value token (VET).
pub const VET_DECIMALS: u8 = 18;

/// Decimal places of the gas token (VTHO).
pub const VTHO_DECIMALS: u8 = 18;

// ---------------------------------------------------------------------------
// GasSchedule
// ---------------------------------------------------------------------------

/// Constants of the intrinsic gas formula.
///
/// `intrinsic = tx_gas + Σ clause_cost + Σ data_cost`, where the clause cost
/// depends on whether the clause has a recipient and the data cost on
/// whether each byte is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    pub tx_gas: u64,
    pub clause_gas: u64,
    pub clause_gas_contract_creation: u64,
    pub tx_data_zero_gas: u64,
    pub tx_data_non_zero_gas: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            tx_gas: TX_GAS,
            clause_gas: CLAUSE_GAS,
            clause_gas_contract_creation: CLAUSE_GAS_CONTRACT_CREATION,
            tx_data_zero_gas: TX_DATA_ZERO_GAS,
            tx_data_non_zero_gas: TX_DATA_NON_ZERO_GAS,
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Per-network validation parameters.
///
/// Deserializes from a partial table; missing keys fall back to the testnet
/// preset, which is where tutorials and integration tests live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Friendly name, used only for logging.
    pub name: String,
    /// Chain tag every transaction must carry.
    pub chain_tag: u8,
    /// Largest accepted `expiration`, inclusive.
    pub max_expiration: u32,
    /// Intrinsic gas constants.
    pub gas: GasSchedule,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            chain_tag: CHAIN_TAG_MAINNET,
            max_expiration: DEFAULT_MAX_EXPIRATION,
            gas: GasSchedule::default(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            chain_tag: CHAIN_TAG_TESTNET,
            max_expiration: DEFAULT_MAX_EXPIRATION,
            gas: GasSchedule::default(),
        }
    }

    /// A network identified only by its chain tag, e.g. a solo node whose
    /// tag was read from its genesis block.
    pub fn custom(chain_tag: u8) -> Self {
        Self {
            name: format!("custom(0x{:02x})", chain_tag),
            chain_tag,
            max_expiration: DEFAULT_MAX_EXPIRATION,
            gas: GasSchedule::default(),
        }
    }

    /// Looks up a preset by name. Returns `None` for unknown names; we
    /// don't guess.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "main" | "mainnet" => Some(Self::mainnet()),
            "test" | "testnet" => Some(Self::testnet()),
            _ => None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

/// Returns a friendly name for a chain tag, mainly for logging.
pub fn network_name(chain_tag: u8) -> String {
    match chain_tag {
        CHAIN_TAG_MAINNET => "mainnet".to_string(),
        CHAIN_TAG_TESTNET => "testnet".to_string(),
        other => format!("unknown(0x{:02x})", other),
    }
}
