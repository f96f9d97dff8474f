// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # vetx Protocol Library
//!
//! Building, validating, encoding and signing VeChainThor transactions.
//!
//! A transaction is assembled as a draft, checked against a network's rules,
//! hashed, signed by an injected [`transaction::SigningProvider`] and finally
//! encoded for submission. Each of those stages is a distinct type, so the
//! compiler refuses to sign a draft or submit an unsigned body.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, gas schedule, network presets.
//! - **crypto**: BLAKE2b-256 and Keccak-256 hashing, secp256k1 keys,
//!   signature recovery.
//! - **transaction**: Drafts, validation, canonical codec, signing.
//! - **transport**: The node interface and the one-shot send workflow.
//! - **error**: The crate-level error wrapping every stage.
//!
//! ## Quick Start
//!
//! ```
//! use alloy_primitives::{Address, U256};
//! use vetx_protocol::config::NetworkConfig;
//! use vetx_protocol::transaction::{final_encode, IntentBuilder, LocalSigner, Validator};
//!
//! let signer = LocalSigner::random();
//! let draft = IntentBuilder::new(0x27)
//!     .transfer(Address::repeat_byte(0x11), U256::from(10u8))
//!     .gas_price_coef(0)
//!     .gas(21_000)
//!     .build();
//!
//! let validator = Validator::new(NetworkConfig::testnet());
//! let signed = validator.validate(&draft)?.hashed().sign(&signer)?;
//! let raw = final_encode(&signed);
//! assert!(!raw.is_empty());
//! # Ok::<(), vetx_protocol::error::TxError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod transaction;
pub mod transport;

pub use error::TxError;
