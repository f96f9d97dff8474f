//! Core value types for VeChainThor transactions.
//!
//! These are the vocabulary every other transaction module speaks: clauses,
//! block references, reserved flags, the fee model sum type, and the two
//! tokens a transaction moves (value in VET, gas paid in VTHO).

use alloy_primitives::{Address, Bytes, B256, B64, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ADDRESS_LENGTH, FEATURE_DELEGATION, VET_DECIMALS, VTHO_DECIMALS};

// ---------------------------------------------------------------------------
// Clause
// ---------------------------------------------------------------------------

/// One transfer or call instruction inside a transaction.
///
/// `to` is kept as raw bytes so an ill-formed recipient can be reported as a
/// validation error instead of a parse failure. After validation it is
/// either `None` (contract deployment) or exactly 20 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    /// Recipient account, or `None` to deploy `data` as a contract.
    #[serde(default)]
    pub to: Option<Bytes>,
    /// Amount of VET in wei.
    #[serde(default)]
    pub value: U256,
    /// Call data or deployment bytecode. Empty for plain transfers.
    #[serde(default)]
    pub data: Bytes,
}

impl Clause {
    /// A plain VET transfer.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self::call(to, value, Bytes::new())
    }

    /// A contract call, optionally carrying value.
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to: Some(Bytes::copy_from_slice(to.as_slice())),
            value,
            data,
        }
    }

    /// A contract deployment.
    pub fn deploy(value: U256, bytecode: Bytes) -> Self {
        Self {
            to: None,
            value,
            data: bytecode,
        }
    }

    /// The recipient as a typed address, if `to` is exactly 20 bytes.
    pub fn to_address(&self) -> Option<Address> {
        self.to
            .as_ref()
            .filter(|to| to.len() == ADDRESS_LENGTH)
            .map(|to| Address::from_slice(to))
    }

    /// `true` when the clause deploys a contract (empty recipient).
    pub fn is_contract_creation(&self) -> bool {
        self.to.as_ref().map_or(true, |to| to.is_empty())
    }
}

// ---------------------------------------------------------------------------
// BlockRef
// ---------------------------------------------------------------------------

/// Reference to a recent block: the leading 8 bytes of its id.
///
/// The first 4 bytes of a block id are the block number, so a block
/// reference also tells the node which height the expiration window starts
/// from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockRef(pub B64);

impl BlockRef {
    /// Derives a block reference from a full 32-byte block id.
    pub fn from_block_id(id: &B256) -> Self {
        Self(B64::from_slice(&id[..8]))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(B64::from(value.to_be_bytes()))
    }

    /// Big-endian integer form, as carried on the wire.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0 .0)
    }

    /// Number of the referenced block.
    pub fn block_number(&self) -> u32 {
        (self.as_u64() >> 32) as u32
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chain tag of a network, read from its genesis block id.
pub fn chain_tag_from_genesis(genesis_id: &B256) -> u8 {
    genesis_id[31]
}

// ---------------------------------------------------------------------------
// Reserved / Features
// ---------------------------------------------------------------------------

/// Feature bits carried in the reserved field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(pub u32);

impl Features {
    pub const NONE: Features = Features(0);
    pub const DELEGATED: Features = Features(FEATURE_DELEGATION);

    /// `true` when a separate gas payer co-signs the transaction.
    pub fn is_delegated(&self) -> bool {
        self.0 & FEATURE_DELEGATION == FEATURE_DELEGATION
    }

    pub fn with_delegation(self, enabled: bool) -> Self {
        if enabled {
            Features(self.0 | FEATURE_DELEGATION)
        } else {
            Features(self.0 & !FEATURE_DELEGATION)
        }
    }
}

/// The reserved field as supplied by a caller.
///
/// `unused` exists so that a draft can describe what arrived on the wire;
/// validation rejects it unless it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserved {
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub unused: Vec<Bytes>,
}

// ---------------------------------------------------------------------------
// FeeModel
// ---------------------------------------------------------------------------

/// How the sender prices gas. Exactly one model per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeModel {
    /// Pre-Galactica pricing: `base + base * coef / 255`.
    Legacy { gas_price_coef: u8 },
    /// Base fee plus a capped tip.
    Dynamic {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

impl FeeModel {
    /// `true` for transactions that carry the dynamic-fee type marker.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }

    /// Price paid per unit of gas given the network's current base price.
    /// Saturates at `U256::MAX` instead of wrapping.
    pub fn effective_gas_price(&self, base_gas_price: U256) -> U256 {
        match *self {
            Self::Legacy { gas_price_coef } => {
                // base * coef / 255, split on base = 255q + r so neither
                // product can overflow. The bonus never exceeds base.
                let coef = U256::from(gas_price_coef);
                let divisor = U256::from(u8::MAX);
                let bonus = (base_gas_price / divisor) * coef
                    + (base_gas_price % divisor) * coef / divisor;
                base_gas_price.saturating_add(bonus)
            }
            Self::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => max_fee_per_gas.min(base_gas_price.saturating_add(max_priority_fee_per_gas)),
        }
    }

    /// Upper bound on VTHO spent if all of `gas` is consumed.
    pub fn max_fee(&self, gas: u64, base_gas_price: U256) -> U256 {
        self.effective_gas_price(base_gas_price)
            .saturating_mul(U256::from(gas))
    }
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy { gas_price_coef } => write!(f, "legacy(coef={})", gas_price_coef),
            Self::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => write!(
                f,
                "dynamic(max_fee={}, max_priority_fee={})",
                max_fee_per_gas, max_priority_fee_per_gas
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Token / Amount
// ---------------------------------------------------------------------------

/// The two tokens a transaction touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Value token, moved by clauses.
    Vet,
    /// Gas token, burned to pay for execution.
    Vtho,
}

impl Token {
    pub fn decimals(&self) -> u8 {
        match self {
            Self::Vet => VET_DECIMALS,
            Self::Vtho => VTHO_DECIMALS,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vet => write!(f, "VET"),
            Self::Vtho => write!(f, "VTHO"),
        }
    }
}

/// An amount in the smallest unit of a token.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use vetx_protocol::transaction::types::{Amount, Token};
///
/// let ten_vet = Amount::whole(10, Token::Vet);
/// assert_eq!(ten_vet.value, U256::from(10u128 * 10u128.pow(18)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: U256,
    pub token: Token,
}

impl Amount {
    pub fn new(value: U256, token: Token) -> Self {
        Self { value, token }
    }

    /// `units` whole tokens, scaled to the smallest unit.
    pub fn whole(units: u64, token: Token) -> Self {
        let scale = U256::from(10u8).pow(U256::from(token.decimals()));
        Self::new(U256::from(units) * scale, token)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Human-readable string, e.g. `"1.500000000000000000 VET"`.
    pub fn display_decimal(&self) -> String {
        let decimals = self.token.decimals() as usize;
        let divisor = U256::from(10u8).pow(U256::from(decimals));
        let whole = self.value / divisor;
        let frac = self.value % divisor;
        format!(
            "{}.{:0>width$} {}",
            whole,
            frac.to_string(),
            self.token,
            width = decimals
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.token)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
