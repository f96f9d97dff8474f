//! Draft construction via the builder pattern.
//!
//! A [`TransactionIntent`] is the caller's description of a transaction
//! before anything has been checked. It is deliberately permissive: the fee
//! fields are independent options and the reserved field may carry unused
//! slots, so that whatever a caller (or a JSON file) hands us can be
//! represented and then rejected with a precise error by
//! [`super::validation::Validator`].
//!
//! [`IntentBuilder`] fills the fields fluently. It never validates; `build()`
//! always succeeds and returns a draft.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::types::{BlockRef, Clause, Features, FeeModel, Reserved};
use crate::config::DEFAULT_EXPIRATION;

// ---------------------------------------------------------------------------
// TransactionIntent
// ---------------------------------------------------------------------------

/// Caller-supplied transaction description, pre-validation.
///
/// Either `gas_price_coef` or both dynamic fee fields should be set. Setting
/// both models, or neither, is representable here and rejected later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    /// Network identifier; last byte of the genesis block id.
    pub chain_tag: u8,
    /// Leading 8 bytes of a recent block id.
    pub block_ref: BlockRef,
    /// Number of blocks after `block_ref` during which the transaction may
    /// be included.
    pub expiration: u32,
    /// Ordered instructions. Execution follows this order.
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub gas_price_coef: Option<u8>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
    /// Maximum gas the transaction may consume.
    pub gas: u64,
    /// Id of a transaction that must be included first.
    #[serde(default)]
    pub depends_on: Option<B256>,
    /// Sender-chosen replay protection value.
    pub nonce: u64,
    #[serde(default)]
    pub reserved: Reserved,
}

impl TransactionIntent {
    /// Total VET moved by all clauses, saturating at `U256::MAX`.
    pub fn total_value(&self) -> U256 {
        self.clauses
            .iter()
            .fold(U256::ZERO, |acc, c| acc.saturating_add(c.value))
    }
}

// ---------------------------------------------------------------------------
// IntentBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`TransactionIntent`] drafts.
///
/// # Usage
///
/// ```
/// use alloy_primitives::{Address, U256};
/// use vetx_protocol::transaction::{Clause, IntentBuilder};
/// use vetx_protocol::transaction::types::BlockRef;
///
/// let draft = IntentBuilder::new(0x27)
///     .block_ref(BlockRef::from_u64(0x0000_0001_0000_0000))
///     .clause(Clause::transfer(Address::repeat_byte(0x11), U256::from(1u8)))
///     .gas_price_coef(0)
///     .gas(21_000)
///     .nonce(7)
///     .build();
///
/// assert_eq!(draft.expiration, 32);
/// ```
///
/// Defaults: `expiration` 32 blocks, a random `nonce`, no fee model, no
/// dependency, no reserved features.
#[derive(Debug, Clone)]
pub struct IntentBuilder {
    intent: TransactionIntent,
}

impl IntentBuilder {
    /// Creates a builder for the network identified by `chain_tag`.
    pub fn new(chain_tag: u8) -> Self {
        Self {
            intent: TransactionIntent {
                chain_tag,
                block_ref: BlockRef::default(),
                expiration: DEFAULT_EXPIRATION,
                clauses: Vec::new(),
                gas_price_coef: None,
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
                gas: 0,
                depends_on: None,
                nonce: rand::random(),
                reserved: Reserved::default(),
            },
        }
    }

    pub fn block_ref(mut self, block_ref: BlockRef) -> Self {
        self.intent.block_ref = block_ref;
        self
    }

    /// Uses the leading bytes of `block_id` as the block reference.
    pub fn block_ref_from_id(self, block_id: &B256) -> Self {
        self.block_ref(BlockRef::from_block_id(block_id))
    }

    pub fn expiration(mut self, blocks: u32) -> Self {
        self.intent.expiration = blocks;
        self
    }

    /// Appends a clause. Order is preserved.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.intent.clauses.push(clause);
        self
    }

    /// Appends a plain VET transfer.
    pub fn transfer(self, to: Address, value: U256) -> Self {
        self.clause(Clause::transfer(to, value))
    }

    /// Appends a contract call.
    pub fn call(self, to: Address, value: U256, data: Bytes) -> Self {
        self.clause(Clause::call(to, value, data))
    }

    /// Sets the legacy gas price coefficient.
    pub fn gas_price_coef(mut self, coef: u8) -> Self {
        self.intent.gas_price_coef = Some(coef);
        self
    }

    /// Sets both dynamic fee fields.
    pub fn dynamic_fee(mut self, max_fee_per_gas: U256, max_priority_fee_per_gas: U256) -> Self {
        self.intent.max_fee_per_gas = Some(max_fee_per_gas);
        self.intent.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    /// Sets the fee fields from an already well-formed [`FeeModel`],
    /// clearing the fields of the other model.
    pub fn fee_model(mut self, fee: FeeModel) -> Self {
        match fee {
            FeeModel::Legacy { gas_price_coef } => {
                self.intent.gas_price_coef = Some(gas_price_coef);
                self.intent.max_fee_per_gas = None;
                self.intent.max_priority_fee_per_gas = None;
            }
            FeeModel::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                self.intent.gas_price_coef = None;
                self.intent.max_fee_per_gas = Some(max_fee_per_gas);
                self.intent.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            }
        }
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.intent.gas = gas;
        self
    }

    pub fn depends_on(mut self, tx_id: B256) -> Self {
        self.intent.depends_on = Some(tx_id);
        self
    }

    /// Overrides the random default nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.intent.nonce = nonce;
        self
    }

    /// Marks the transaction as fee-delegated: a second signer pays for gas.
    pub fn delegated(mut self) -> Self {
        self.intent.reserved.features = self.intent.reserved.features.with_delegation(true);
        self
    }

    pub fn features(mut self, features: Features) -> Self {
        self.intent.reserved.features = features;
        self
    }

    /// Returns the draft. Never fails; validation is a separate step.
    pub fn build(self) -> TransactionIntent {
        self.intent
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
