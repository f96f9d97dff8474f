//! Field validation: the gate between a caller's draft and everything that
//! encodes, hashes or signs.
//!
//! [`Validator::validate`] is a pure function from a [`TransactionIntent`] to
//! a [`ValidatedIntent`]. The checks run in a fixed order (network,
//! expiration, clauses, fee model, gas, reserved) and the first failure is
//! returned. Nothing cryptographic or networked happens before validation
//! succeeds.

use alloy_primitives::B256;
use serde::Serialize;
use std::ops::Deref;
use thiserror::Error;

use super::builder::TransactionIntent;
use super::types::{BlockRef, Clause, Features, FeeModel, Reserved};
use crate::config::{GasSchedule, NetworkConfig, ADDRESS_LENGTH};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a draft is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The chain tag does not match the configured network.
    #[error("invalid network: expected chain tag 0x{expected:02x}, got 0x{actual:02x}")]
    InvalidNetwork { expected: u8, actual: u8 },

    /// Expiration is zero or beyond the configured replay window.
    #[error("invalid expiration: {expiration} blocks (must be 1..={max})")]
    InvalidExpiration { expiration: u32, max: u32 },

    /// The clause list is empty or a clause recipient is malformed.
    #[error("invalid clause: {reason}")]
    InvalidClause { reason: String },

    /// Neither, or both, fee models are populated, or the dynamic fee
    /// fields are inconsistent.
    #[error("invalid fee model: {reason}")]
    InvalidFeeModel { reason: String },

    /// The gas limit does not cover the intrinsic cost of the clauses.
    #[error("insufficient gas: intrinsic cost is {required}, gas limit is {provided}")]
    InsufficientGas { required: u64, provided: u64 },

    /// The unused part of the reserved field is not empty.
    #[error("invalid reserved field: {unused} unused slot(s) present")]
    InvalidReserved { unused: usize },
}

// ---------------------------------------------------------------------------
// TxBody
// ---------------------------------------------------------------------------

/// The fields of a transaction body in their canonical shape.
///
/// The fee model is a sum type, recipients are either absent or exactly 20
/// bytes, and the reserved field holds nothing but feature bits. A bare
/// `TxBody` has not been checked against any network: it can be read and
/// encoded, but not signed. Signing needs a [`ValidatedIntent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TxBody {
    chain_tag: u8,
    block_ref: BlockRef,
    expiration: u32,
    clauses: Vec<Clause>,
    fee: FeeModel,
    gas: u64,
    depends_on: Option<B256>,
    nonce: u64,
    features: Features,
}

impl TxBody {
    /// Assembles a body from parts already known to be well-formed.
    /// Used by the decoder, which enforces the structural invariants itself.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        chain_tag: u8,
        block_ref: BlockRef,
        expiration: u32,
        clauses: Vec<Clause>,
        fee: FeeModel,
        gas: u64,
        depends_on: Option<B256>,
        nonce: u64,
        features: Features,
    ) -> Self {
        Self {
            chain_tag,
            block_ref,
            expiration,
            clauses,
            fee,
            gas,
            depends_on,
            nonce,
            features,
        }
    }

    pub fn chain_tag(&self) -> u8 {
        self.chain_tag
    }

    pub fn block_ref(&self) -> BlockRef {
        self.block_ref
    }

    pub fn expiration(&self) -> u32 {
        self.expiration
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn fee(&self) -> &FeeModel {
        &self.fee
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }

    pub fn depends_on(&self) -> Option<B256> {
        self.depends_on
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// `true` when a gas payer must co-sign.
    pub fn is_delegated(&self) -> bool {
        self.features.is_delegated()
    }

    pub fn intrinsic_gas(&self, schedule: &GasSchedule) -> u64 {
        intrinsic_gas(schedule, &self.clauses)
    }

    /// Converts back into a draft, e.g. to validate a decoded body against
    /// a network's configuration.
    pub fn to_intent(&self) -> TransactionIntent {
        let (gas_price_coef, max_fee_per_gas, max_priority_fee_per_gas) = match self.fee {
            FeeModel::Legacy { gas_price_coef } => (Some(gas_price_coef), None, None),
            FeeModel::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)),
        };

        TransactionIntent {
            chain_tag: self.chain_tag,
            block_ref: self.block_ref,
            expiration: self.expiration,
            clauses: self.clauses.clone(),
            gas_price_coef,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            gas: self.gas,
            depends_on: self.depends_on,
            nonce: self.nonce,
            reserved: Reserved {
                features: self.features,
                unused: Vec::new(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ValidatedIntent
// ---------------------------------------------------------------------------

/// A transaction body that passed [`Validator`] checks for one network.
///
/// The only constructor is the validator, so holding one proves the chain
/// tag, expiration and gas limit were checked. Read access goes through
/// [`TxBody`] via `Deref`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidatedIntent(TxBody);

impl ValidatedIntent {
    pub fn body(&self) -> &TxBody {
        &self.0
    }
}

impl Deref for ValidatedIntent {
    type Target = TxBody;

    fn deref(&self) -> &TxBody {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Intrinsic gas
// ---------------------------------------------------------------------------

/// Minimum gas a transaction with these clauses consumes before executing
/// anything.
///
/// A transaction with no clauses is charged as if it had one plain clause.
/// Arithmetic saturates, so absurd data sizes surface as insufficient gas
/// rather than wrapping.
pub fn intrinsic_gas(schedule: &GasSchedule, clauses: &[Clause]) -> u64 {
    if clauses.is_empty() {
        return schedule.tx_gas.saturating_add(schedule.clause_gas);
    }

    clauses.iter().fold(schedule.tx_gas, |total, clause| {
        let clause_cost = if clause.is_contract_creation() {
            schedule.clause_gas_contract_creation
        } else {
            schedule.clause_gas
        };
        total
            .saturating_add(clause_cost)
            .saturating_add(data_gas(schedule, &clause.data))
    })
}

fn data_gas(schedule: &GasSchedule, data: &[u8]) -> u64 {
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    zeros
        .saturating_mul(schedule.tx_data_zero_gas)
        .saturating_add(non_zeros.saturating_mul(schedule.tx_data_non_zero_gas))
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validates drafts against one network's parameters.
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: NetworkConfig,
}

impl Validator {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Checks every field of `intent` and returns a normalized copy.
    ///
    /// Normalization is limited to clause recipients: an explicitly empty
    /// `to` becomes `None`, so there is exactly one representation of a
    /// deployment.
    ///
    /// # Errors
    ///
    /// The first failing check, in the order network, expiration, clauses,
    /// fee model, gas, reserved.
    pub fn validate(&self, intent: &TransactionIntent) -> Result<ValidatedIntent, ValidationError> {
        if intent.chain_tag != self.config.chain_tag {
            return Err(ValidationError::InvalidNetwork {
                expected: self.config.chain_tag,
                actual: intent.chain_tag,
            });
        }

        if intent.expiration == 0 || intent.expiration > self.config.max_expiration {
            return Err(ValidationError::InvalidExpiration {
                expiration: intent.expiration,
                max: self.config.max_expiration,
            });
        }

        let clauses = normalize_clauses(&intent.clauses)?;
        let fee = fee_model(intent)?;

        let required = intrinsic_gas(&self.config.gas, &clauses);
        if intent.gas < required {
            return Err(ValidationError::InsufficientGas {
                required,
                provided: intent.gas,
            });
        }

        if !intent.reserved.unused.is_empty() {
            return Err(ValidationError::InvalidReserved {
                unused: intent.reserved.unused.len(),
            });
        }

        tracing::debug!(
            network = %self.config.name,
            chain_tag = intent.chain_tag,
            clauses = clauses.len(),
            gas = intent.gas,
            intrinsic_gas = required,
            fee = %fee,
            "transaction intent validated"
        );

        Ok(ValidatedIntent(TxBody {
            chain_tag: intent.chain_tag,
            block_ref: intent.block_ref,
            expiration: intent.expiration,
            clauses,
            fee,
            gas: intent.gas,
            depends_on: intent.depends_on,
            nonce: intent.nonce,
            features: intent.reserved.features,
        }))
    }

    /// Validates a body that did not come from this validator: one decoded
    /// from bytes produced elsewhere, or one validated for another network.
    pub fn revalidate(&self, body: &TxBody) -> Result<ValidatedIntent, ValidationError> {
        self.validate(&body.to_intent())
    }
}

fn normalize_clauses(clauses: &[Clause]) -> Result<Vec<Clause>, ValidationError> {
    if clauses.is_empty() {
        return Err(ValidationError::InvalidClause {
            reason: "transaction has no clauses".to_string(),
        });
    }

    clauses
        .iter()
        .enumerate()
        .map(|(index, clause)| {
            let to = match &clause.to {
                None => None,
                Some(to) if to.is_empty() => None,
                Some(to) if to.len() == ADDRESS_LENGTH => Some(to.clone()),
                Some(to) => {
                    return Err(ValidationError::InvalidClause {
                        reason: format!(
                            "clause {}: recipient is {} bytes, expected 0 or {}",
                            index,
                            to.len(),
                            ADDRESS_LENGTH
                        ),
                    })
                }
            };
            Ok(Clause {
                to,
                value: clause.value,
                data: clause.data.clone(),
            })
        })
        .collect()
}

fn fee_model(intent: &TransactionIntent) -> Result<FeeModel, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFeeModel {
        reason: reason.to_string(),
    };

    match (
        intent.gas_price_coef,
        intent.max_fee_per_gas,
        intent.max_priority_fee_per_gas,
    ) {
        (Some(gas_price_coef), None, None) => Ok(FeeModel::Legacy { gas_price_coef }),
        (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => {
            if max_priority_fee_per_gas > max_fee_per_gas {
                return Err(invalid(
                    "max priority fee per gas exceeds max fee per gas",
                ));
            }
            Ok(FeeModel::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            })
        }
        (None, None, None) => Err(invalid("no fee model set")),
        (Some(_), _, _) => Err(invalid(
            "gas price coefficient and dynamic fee fields are mutually exclusive",
        )),
        (None, _, _) => Err(invalid(
            "dynamic fee requires both max fee and max priority fee per gas",
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
