//! # Key Management
//!
//! secp256k1 keypairs and address derivation.
//!
//! A [`ThorKeypair`] is the single in-memory secret a signer holds. It is
//! never serialized, never logged, and never shared between signers: each
//! signing provider owns its own keypair.
//!
//! ## Address derivation
//!
//! `address = keccak256(uncompressed_public_key[1..])[12..]`: drop the
//! `0x04` prefix of the 65-byte uncompressed key, hash the remaining 64 bytes
//! and keep the last 20.

use alloy_primitives::{Address, B256};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use std::fmt;
use thiserror::Error;

use super::hash::keccak256;
use crate::config::SIGNATURE_LENGTH;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* a key was rejected.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,
}

/// A secp256k1 keypair.
///
/// `ThorKeypair` does NOT implement `Serialize`, `Clone` or a revealing
/// `Debug`. Exporting the secret is an explicit call to
/// [`secret_key_bytes`](Self::secret_key_bytes).
///
/// # Examples
///
/// ```
/// use vetx_protocol::crypto::keys::ThorKeypair;
/// use vetx_protocol::crypto::recover_address;
/// use alloy_primitives::B256;
///
/// let kp = ThorKeypair::generate();
/// let hash = B256::repeat_byte(0x11);
/// let sig = kp.sign_hash(&hash);
/// assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());
/// ```
pub struct ThorKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl ThorKeypair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        loop {
            OsRng.fill_bytes(&mut seed);
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(kp) = Self::from_bytes(&seed) {
                return kp;
            }
        }
    }

    /// Reconstructs a keypair from a raw 32-byte secret scalar.
    pub fn from_bytes(secret_key_bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let secret =
            SecretKey::from_slice(secret_key_bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        Ok(Self { secret, public })
    }

    /// Reconstructs a keypair from a hex-encoded secret, with or without a
    /// `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&arr)
    }

    /// The 65-byte uncompressed public key, `0x04` prefix included.
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        self.public.serialize_uncompressed()
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public)
    }

    /// Signs a 32-byte digest, returning `r || s || recovery_id`.
    ///
    /// libsecp256k1 signs deterministically (RFC 6979) and always emits a
    /// low-S signature, so the same key and hash give the same bytes.
    pub fn sign_hash(&self, hash: &B256) -> [u8; SIGNATURE_LENGTH] {
        let msg = Message::from_digest(hash.0);
        let (recovery_id, compact) = SECP256K1
            .sign_ecdsa_recoverable(&msg, &self.secret)
            .serialize_compact();

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8;
        out
    }

    /// Exports the raw 32-byte secret. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }
}

impl fmt::Debug for ThorKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThorKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derives the account address of a public key.
pub fn public_key_to_address(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);
    Address::from_slice(&digest[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_of_secret_one() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let kp = ThorKeypair::from_bytes(&secret).unwrap();
        assert_eq!(
            kp.address(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn address_from_hex_secret() {
        let kp = ThorKeypair::from_hex(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        assert_eq!(
            kp.address(),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert!(ThorKeypair::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(ThorKeypair::from_hex("zz").is_err());
        assert!(ThorKeypair::from_hex("0x0102").is_err());
    }

    #[test]
    fn secret_roundtrip() {
        let kp = ThorKeypair::generate();
        let restored = ThorKeypair::from_bytes(&kp.secret_key_bytes()).unwrap();
        assert_eq!(kp.address(), restored.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = ThorKeypair::generate();
        let hash = B256::repeat_byte(0xab);
        assert_eq!(kp.sign_hash(&hash), kp.sign_hash(&hash));
    }

    #[test]
    fn recovery_id_is_zero_or_one() {
        let kp = ThorKeypair::generate();
        let sig = kp.sign_hash(&B256::repeat_byte(0x42));
        assert!(sig[64] <= 1);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = ThorKeypair::from_hex(
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let rendered = format!("{:?}", kp);
        assert!(!rendered.contains("4c0883a6"));
        assert!(rendered.contains("address"));
    }
}
