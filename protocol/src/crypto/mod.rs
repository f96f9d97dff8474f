//! # Cryptographic Primitives
//!
//! Every signing hash, every signature and every address derivation flows
//! through here:
//!
//! - **BLAKE2b-256** for signing hashes and transaction ids.
//! - **Keccak-256** for deriving account addresses from public keys.
//! - **secp256k1** recoverable ECDSA for signatures.
//!
//! Everything is a thin, type-safe wrapper around audited implementations.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{blake2b256, blake2b256_concat, keccak256};
pub use keys::{public_key_to_address, ThorKeypair};
pub use signatures::{recover_address, verify, SignatureError};
