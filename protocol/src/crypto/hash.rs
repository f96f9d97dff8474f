//! # Hashing Utilities
//!
//! Two hash functions, each with one job:
//!
//! - **BLAKE2b-256** hashes the unsigned transaction encoding (the signing
//!   hash) and the `signing_hash || origin` pair (transaction id, delegator
//!   signing hash).
//! - **Keccak-256** turns an uncompressed public key into an address, the
//!   same way Ethereum does.

use alloy_primitives::B256;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;

/// Computes the 32-byte BLAKE2b digest of `data`.
///
/// # Example
///
/// ```
/// use vetx_protocol::crypto::blake2b256;
///
/// let hash = blake2b256(b"hello world");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake2b256(data: &[u8]) -> B256 {
    blake2b256_concat(&[data])
}

/// Hashes several byte slices as if they were concatenated, without
/// allocating the concatenation.
pub fn blake2b256_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    B256::from_slice(&hasher.finalize())
}

/// Computes the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(data))
}
