//! # Transaction Module
//!
//! Construction, validation, encoding and signing of VeChainThor
//! transactions. A transaction moves through four stages, each its own type,
//! so that an unvalidated draft can never be signed and an unsigned body can
//! never be submitted:
//!
//! ```text
//! TransactionIntent --validate--> ValidatedIntent --hashed--> HashedIntent
//!                                       ^                         |
//!                                       | revalidate              | attach_signature / sign
//!                                       |                         v
//! bytes --decode_unsigned--> DecodedIntent               SignedTransaction --final_encode--> bytes
//! ```
//!
//! Decoded values carry a [`TxBody`] that is canonical but unchecked; only
//! a [`Validator`] turns one back into something signable.
//!
//! ## Layout
//!
//! ```text
//! types.rs      Clause, BlockRef, Features, FeeModel, Token, Amount
//! builder.rs    TransactionIntent drafts and the fluent IntentBuilder
//! validation.rs Validator, TxBody, ValidatedIntent, intrinsic gas
//! codec.rs      Canonical RLP encoding, strict decoding, DecodedIntent
//! signing.rs    SigningProvider, signing hashes, HashedIntent
//! signed.rs     TxSignature, SignedTransaction, DecodedTransaction
//! ```
//!
//! ## Notes
//!
//! - Amounts are `U256` base units (wei for VET, the same scale for VTHO).
//!   No floating point anywhere near monetary values.
//! - Legacy transactions encode as a bare RLP list; dynamic-fee ones carry a
//!   leading `0x51` type byte.
//! - Signing providers are passed per call. Nothing here holds a key.

pub mod builder;
pub mod codec;
pub mod signed;
pub mod signing;
pub mod types;
pub mod validation;

pub use builder::{IntentBuilder, TransactionIntent};
pub use codec::{decode_unsigned, encode_unsigned, CodecError, DecodedIntent, TxType};
pub use signed::{
    final_encode, DecodedTransaction, RawTransaction, SignedTransaction, TxSignature,
};
pub use signing::{
    attach_signature, compute_signing_hash, delegator_signing_hash, verify, HashedIntent,
    LocalSigner, SigningError, SigningProvider,
};
pub use types::{Amount, BlockRef, Clause, Features, FeeModel, Reserved, Token};
pub use validation::{intrinsic_gas, TxBody, ValidatedIntent, ValidationError, Validator};
