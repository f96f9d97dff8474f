//! # Signature Recovery
//!
//! Recoverable secp256k1 signatures carry enough information to rebuild the
//! signer's public key from the signature and the signed digest. A
//! transaction never states who sent it; the sender is whoever recovers from
//! its signature.

use alloy_primitives::{Address, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SECP256K1};
use thiserror::Error;

use super::keys::public_key_to_address;
use crate::config::SIGNATURE_LENGTH;

/// Errors during signature recovery.
///
/// Deliberately coarse; callers only need to know the signature is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// Recovers the address that produced `signature` over `hash`.
///
/// `signature` must be exactly 65 bytes: `r || s || recovery_id`, with the
/// recovery id in `0..=3`.
pub fn recover_address(hash: &B256, signature: &[u8]) -> Result<Address, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength {
            expected: SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    let v = signature[64];
    let recovery_id =
        RecoveryId::from_i32(i32::from(v)).map_err(|_| SignatureError::InvalidRecoveryId(v))?;
    let sig = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    let msg = Message::from_digest(hash.0);
    let public = SECP256K1
        .recover_ecdsa(&msg, &sig)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(public_key_to_address(&public))
}

/// Returns `true` if `signature` over `hash` recovers to `expected`.
///
/// Malformed signatures are simply `false`; there is no error oracle.
pub fn verify(hash: &B256, signature: &[u8], expected: &Address) -> bool {
    matches!(recover_address(hash, signature), Ok(addr) if addr == *expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::ThorKeypair;

    #[test]
    fn recover_matches_signer() {
        let kp = ThorKeypair::generate();
        let hash = B256::repeat_byte(0x07);
        let sig = kp.sign_hash(&hash);
        assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());
        assert!(verify(&hash, &sig, &kp.address()));
    }

    #[test]
    fn wrong_hash_recovers_someone_else() {
        let kp = ThorKeypair::generate();
        let sig = kp.sign_hash(&B256::repeat_byte(0x01));
        assert!(!verify(&B256::repeat_byte(0x02), &sig, &kp.address()));
    }

    #[test]
    fn short_signature_is_rejected() {
        let err = recover_address(&B256::ZERO, &[0u8; 64]).unwrap_err();
        assert_eq!(
            err,
            SignatureError::InvalidLength {
                expected: 65,
                actual: 64
            }
        );
    }

    #[test]
    fn bad_recovery_id_is_rejected() {
        let kp = ThorKeypair::generate();
        let hash = B256::repeat_byte(0x09);
        let mut sig = kp.sign_hash(&hash);
        sig[64] = 27;
        assert_eq!(
            recover_address(&hash, &sig).unwrap_err(),
            SignatureError::InvalidRecoveryId(27)
        );
    }

    #[test]
    fn garbage_signature_verifies_false() {
        assert!(!verify(&B256::ZERO, &[0xffu8; 65], &Address::ZERO));
    }
}
