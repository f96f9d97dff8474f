//! Signing coordination between a validated body and an external signer.
//!
//! Signing is a separate step from building because the key may not be
//! available where the transaction is assembled (hardware wallet, remote
//! signer, a sponsor paying for gas). This module never touches key material
//! directly: it computes the digest to sign, hands it to a
//! [`SigningProvider`] supplied per call, and combines the returned bytes
//! with the body.
//!
//! The signing hash is `blake2b256(encode_unsigned(intent))`. For a
//! fee-delegated transaction the gas payer signs
//! `blake2b256(signing_hash || origin_address)` instead, which binds the
//! payer's consent to one specific sender.

use alloy_primitives::{Address, B256};
use thiserror::Error;

use super::codec::encode_unsigned;
use super::signed::{SignedTransaction, TxSignature};
use super::validation::{TxBody, ValidatedIntent};
use crate::config::SIGNATURE_LENGTH;
use crate::crypto::hash::{blake2b256, blake2b256_concat};
use crate::crypto::keys::{KeyError, ThorKeypair};
use crate::crypto::signatures::SignatureError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures while producing or interpreting signatures.
///
/// Provider failures are opaque: the message is whatever the provider
/// reported, passed through unchanged.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing provider failed: {0}")]
    Provider(String),

    #[error("invalid signature length: {actual} bytes (expected 65 or 130)")]
    InvalidLength { actual: usize },

    #[error("transaction is fee-delegated and needs a gas payer signature")]
    DelegatorRequired,

    #[error("transaction is not fee-delegated")]
    NotDelegated,

    #[error(
        "signature shape does not match delegation flag (delegated: {delegated}, signature: {signature_len} bytes)"
    )]
    DelegationMismatch {
        delegated: bool,
        signature_len: usize,
    },

    #[error(transparent)]
    Recovery(#[from] SignatureError),
}

// ---------------------------------------------------------------------------
// SigningProvider
// ---------------------------------------------------------------------------

/// Anything that can sign a 32-byte digest on behalf of one account.
///
/// Implementations own their key material; callers pass a provider into
/// each signing call rather than relying on any process-wide key.
pub trait SigningProvider: Send + Sync {
    /// The account whose key this provider signs with.
    fn address(&self) -> Address;

    /// Returns a 65-byte recoverable signature `r || s || recovery_id`.
    fn sign_hash(&self, hash: &B256) -> Result<[u8; SIGNATURE_LENGTH], SigningError>;
}

/// A signing provider backed by a single in-memory secp256k1 key.
#[derive(Debug)]
pub struct LocalSigner {
    keypair: ThorKeypair,
}

impl LocalSigner {
    pub fn new(keypair: ThorKeypair) -> Self {
        Self { keypair }
    }

    /// Loads the key from a hex string (with or without `0x`).
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        Ok(Self::new(ThorKeypair::from_hex(secret_hex)?))
    }

    /// A signer with a fresh random key.
    pub fn random() -> Self {
        Self::new(ThorKeypair::generate())
    }
}

impl SigningProvider for LocalSigner {
    fn address(&self) -> Address {
        self.keypair.address()
    }

    fn sign_hash(&self, hash: &B256) -> Result<[u8; SIGNATURE_LENGTH], SigningError> {
        Ok(self.keypair.sign_hash(hash))
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Digest the sender signs. Pure: the same body always yields the same
/// hash.
pub fn compute_signing_hash(intent: &TxBody) -> B256 {
    blake2b256(&encode_unsigned(intent))
}

/// Digest the gas payer of a delegated transaction signs.
pub fn delegator_signing_hash(intent: &TxBody, origin: &Address) -> B256 {
    delegator_hash(&compute_signing_hash(intent), origin)
}

pub(crate) fn delegator_hash(signing_hash: &B256, origin: &Address) -> B256 {
    blake2b256_concat(&[signing_hash.as_slice(), origin.as_slice()])
}

/// Combines a body with signature bytes. Performs no cryptographic check;
/// see [`verify`] for that.
pub fn attach_signature(intent: &ValidatedIntent, signature: TxSignature) -> SignedTransaction {
    SignedTransaction::new(intent.clone(), signature)
}

/// Returns `true` if `tx` was signed by `expected_signer`.
///
/// Recomputes the signing hash from the body, recovers the origin and
/// compares. Any malformed or mismatched signature is `false`.
pub fn verify(tx: &SignedTransaction, expected_signer: &Address) -> bool {
    matches!(tx.origin(), Ok(origin) if origin == *expected_signer)
}

// ---------------------------------------------------------------------------
// HashedIntent
// ---------------------------------------------------------------------------

/// A validated body paired with its signing hash, ready for signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedIntent {
    intent: ValidatedIntent,
    signing_hash: B256,
}

impl ValidatedIntent {
    /// Computes the signing hash and moves to the hashed stage.
    pub fn hashed(self) -> HashedIntent {
        let signing_hash = compute_signing_hash(&self);
        tracing::debug!(
            signing_hash = %signing_hash,
            delegated = self.is_delegated(),
            "signing hash computed"
        );
        HashedIntent {
            intent: self,
            signing_hash,
        }
    }
}

impl HashedIntent {
    pub fn intent(&self) -> &ValidatedIntent {
        &self.intent
    }

    pub fn signing_hash(&self) -> B256 {
        self.signing_hash
    }

    /// Digest the gas payer signs once the origin is known.
    pub fn delegator_signing_hash(&self, origin: &Address) -> B256 {
        delegator_hash(&self.signing_hash, origin)
    }

    /// Attaches externally produced signature bytes.
    pub fn attach_signature(&self, signature: TxSignature) -> SignedTransaction {
        attach_signature(&self.intent, signature)
    }

    /// Signs with a single provider.
    ///
    /// # Errors
    ///
    /// [`SigningError::DelegatorRequired`] if the body carries the
    /// delegation feature; otherwise whatever the provider reports.
    pub fn sign(&self, signer: &dyn SigningProvider) -> Result<SignedTransaction, SigningError> {
        if self.intent.is_delegated() {
            return Err(SigningError::DelegatorRequired);
        }

        let sig = signer.sign_hash(&self.signing_hash)?;
        tracing::debug!(origin = %signer.address(), "transaction signed");
        Ok(self.attach_signature(TxSignature::single(sig)))
    }

    /// Signs a fee-delegated body: `origin` authorizes the clauses and
    /// `gas_payer` pays for them.
    ///
    /// # Errors
    ///
    /// [`SigningError::NotDelegated`] if the delegation feature is not set;
    /// otherwise whatever either provider reports.
    pub fn sign_delegated(
        &self,
        origin: &dyn SigningProvider,
        gas_payer: &dyn SigningProvider,
    ) -> Result<SignedTransaction, SigningError> {
        if !self.intent.is_delegated() {
            return Err(SigningError::NotDelegated);
        }

        let origin_sig = origin.sign_hash(&self.signing_hash)?;
        let payer_hash = self.delegator_signing_hash(&origin.address());
        let payer_sig = gas_payer.sign_hash(&payer_hash)?;

        tracing::debug!(
            origin = %origin.address(),
            gas_payer = %gas_payer.address(),
            "delegated transaction signed"
        );
        Ok(self.attach_signature(TxSignature::delegated(origin_sig, payer_sig)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
