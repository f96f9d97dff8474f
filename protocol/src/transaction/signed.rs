//! Signed transactions and the final wire encoding.

use alloy_primitives::{Address, Bytes, B256};
use serde::Serialize;

use super::codec::{self, CodecError, DecodedIntent};
use super::signing::{compute_signing_hash, delegator_hash, SigningError};
use super::validation::{TxBody, ValidatedIntent, ValidationError, Validator};
use crate::config::{DELEGATED_SIGNATURE_LENGTH, SIGNATURE_LENGTH};
use crate::error::TxError;
use crate::crypto::hash::blake2b256_concat;
use crate::crypto::signatures::recover_address;

// ---------------------------------------------------------------------------
// TxSignature
// ---------------------------------------------------------------------------

/// Signature bytes carried by a transaction: 65 bytes for a single signer,
/// 130 bytes (origin then gas payer) for a fee-delegated one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TxSignature(Bytes);

impl TxSignature {
    /// Wraps raw signature bytes after checking the length.
    ///
    /// # Errors
    ///
    /// [`SigningError::InvalidLength`] unless `bytes` is 65 or 130 long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SigningError> {
        match bytes.len() {
            SIGNATURE_LENGTH | DELEGATED_SIGNATURE_LENGTH => {
                Ok(Self(Bytes::copy_from_slice(bytes)))
            }
            actual => Err(SigningError::InvalidLength { actual }),
        }
    }

    pub fn single(sig: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(Bytes::copy_from_slice(&sig))
    }

    pub fn delegated(origin: [u8; SIGNATURE_LENGTH], gas_payer: [u8; SIGNATURE_LENGTH]) -> Self {
        let mut buf = Vec::with_capacity(DELEGATED_SIGNATURE_LENGTH);
        buf.extend_from_slice(&origin);
        buf.extend_from_slice(&gas_payer);
        Self(buf.into())
    }

    pub fn is_delegated(&self) -> bool {
        self.0.len() == DELEGATED_SIGNATURE_LENGTH
    }

    /// The origin's 65 bytes.
    pub fn origin_part(&self) -> &[u8] {
        &self.0[..SIGNATURE_LENGTH]
    }

    /// The gas payer's 65 bytes, if present.
    pub fn gas_payer_part(&self) -> Option<&[u8]> {
        self.is_delegated().then(|| &self.0[SIGNATURE_LENGTH..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for TxSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A validated body together with its signature. Ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignedTransaction {
    intent: ValidatedIntent,
    signature: TxSignature,
}

impl SignedTransaction {
    pub(crate) fn new(intent: ValidatedIntent, signature: TxSignature) -> Self {
        Self { intent, signature }
    }

    pub fn intent(&self) -> &ValidatedIntent {
        &self.intent
    }

    pub fn signature(&self) -> &TxSignature {
        &self.signature
    }

    pub fn signing_hash(&self) -> B256 {
        compute_signing_hash(&self.intent)
    }

    /// Recovers the sender from the first 65 signature bytes.
    ///
    /// # Errors
    ///
    /// [`SigningError::DelegationMismatch`] if the signature shape disagrees
    /// with the delegation feature; [`SigningError::Recovery`] if the
    /// signature does not recover.
    pub fn origin(&self) -> Result<Address, SigningError> {
        recover_origin(&self.intent, &self.signature)
    }

    /// Recovers the gas payer of a fee-delegated transaction; `None` when
    /// the transaction is not delegated.
    pub fn delegator(&self) -> Result<Option<Address>, SigningError> {
        recover_delegator(&self.intent, &self.signature)
    }

    /// Transaction id: `blake2b256(signing_hash || origin)`.
    pub fn id(&self) -> Result<B256, SigningError> {
        tx_id(&self.intent, &self.signature)
    }

    /// Returns `true` if the origin recovers to `expected_signer`.
    pub fn verify(&self, expected_signer: &Address) -> bool {
        super::signing::verify(self, expected_signer)
    }

    /// Canonical signed encoding, suitable for submission to a node.
    pub fn encode(&self) -> Bytes {
        codec::encode_signed(&self.intent, self.signature.as_bytes())
    }

    /// `0x`-prefixed hex of [`Self::encode`], the form node APIs accept.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }

    /// Decodes a signed transaction and checks its body against
    /// `validator`.
    ///
    /// # Errors
    ///
    /// [`TxError::Codec`] on any structural problem, including a missing
    /// signature; [`TxError::Validation`] if the body is out of policy for
    /// the validator's network.
    pub fn decode(bytes: &[u8], validator: &Validator) -> Result<Self, TxError> {
        Ok(DecodedTransaction::decode(bytes)?.validate(validator)?)
    }
}

// ---------------------------------------------------------------------------
// DecodedTransaction
// ---------------------------------------------------------------------------

/// A signed transaction read back from bytes whose body has not been
/// checked against any network.
///
/// Signers and id can be recovered without a validator, which is enough to
/// inspect or relay it. [`Self::validate`] turns it into a
/// [`SignedTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DecodedTransaction {
    body: DecodedIntent,
    signature: TxSignature,
}

impl DecodedTransaction {
    /// Decodes a signed transaction without applying network policy.
    ///
    /// # Errors
    ///
    /// [`CodecError::MalformedEncoding`] on any structural problem, including
    /// a missing signature.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        match RawTransaction::decode(bytes)? {
            RawTransaction::Signed(tx) => Ok(tx),
            RawTransaction::Unsigned(_) => Err(CodecError::MalformedEncoding {
                reason: "missing signature".to_string(),
            }),
        }
    }

    pub fn body(&self) -> &DecodedIntent {
        &self.body
    }

    pub fn signature(&self) -> &TxSignature {
        &self.signature
    }

    pub fn signing_hash(&self) -> B256 {
        compute_signing_hash(&self.body)
    }

    pub fn origin(&self) -> Result<Address, SigningError> {
        recover_origin(&self.body, &self.signature)
    }

    pub fn delegator(&self) -> Result<Option<Address>, SigningError> {
        recover_delegator(&self.body, &self.signature)
    }

    pub fn id(&self) -> Result<B256, SigningError> {
        tx_id(&self.body, &self.signature)
    }

    pub fn encode(&self) -> Bytes {
        codec::encode_signed(&self.body, self.signature.as_bytes())
    }

    /// Checks the body against `validator` and keeps the signature.
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`] the body fails.
    pub fn validate(self, validator: &Validator) -> Result<SignedTransaction, ValidationError> {
        let intent = validator.revalidate(&self.body)?;
        Ok(SignedTransaction::new(intent, self.signature))
    }
}

fn check_shape(body: &TxBody, signature: &TxSignature) -> Result<(), SigningError> {
    let delegated = body.is_delegated();
    if delegated != signature.is_delegated() {
        return Err(SigningError::DelegationMismatch {
            delegated,
            signature_len: signature.as_bytes().len(),
        });
    }
    Ok(())
}

fn recover_origin(body: &TxBody, signature: &TxSignature) -> Result<Address, SigningError> {
    check_shape(body, signature)?;
    Ok(recover_address(
        &compute_signing_hash(body),
        signature.origin_part(),
    )?)
}

fn recover_delegator(
    body: &TxBody,
    signature: &TxSignature,
) -> Result<Option<Address>, SigningError> {
    check_shape(body, signature)?;
    let Some(payer_sig) = signature.gas_payer_part() else {
        return Ok(None);
    };
    let origin = recover_origin(body, signature)?;
    let hash = delegator_hash(&compute_signing_hash(body), &origin);
    Ok(Some(recover_address(&hash, payer_sig)?))
}

fn tx_id(body: &TxBody, signature: &TxSignature) -> Result<B256, SigningError> {
    let origin = recover_origin(body, signature)?;
    Ok(blake2b256_concat(&[
        compute_signing_hash(body).as_slice(),
        origin.as_slice(),
    ]))
}

/// Either form of an encoded transaction, as found on the wire or in a file.
/// Neither has been checked against a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTransaction {
    Unsigned(DecodedIntent),
    Signed(DecodedTransaction),
}

impl RawTransaction {
    /// Decodes bytes that may or may not carry a signature.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        match codec::decode(bytes)? {
            (body, None) => Ok(Self::Unsigned(DecodedIntent::from_body(body))),
            (body, Some(sig)) => {
                let signature =
                    TxSignature::from_slice(&sig).map_err(|e| CodecError::MalformedEncoding {
                        reason: e.to_string(),
                    })?;
                Ok(Self::Signed(DecodedTransaction {
                    body: DecodedIntent::from_body(body),
                    signature,
                }))
            }
        }
    }

    pub fn body(&self) -> &TxBody {
        match self {
            Self::Unsigned(body) => body.body(),
            Self::Signed(tx) => tx.body().body(),
        }
    }
}

/// Produces the final encoded bytes of a signed transaction.
///
/// Deterministic: the same transaction always yields the same bytes.
pub fn final_encode(tx: &SignedTransaction) -> Bytes {
    let raw = tx.encode();
    tracing::debug!(size = raw.len(), "transaction encoded");
    raw
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::transaction::builder::IntentBuilder;
    use crate::transaction::signing::{attach_signature, LocalSigner, SigningProvider};
    use crate::transaction::types::BlockRef;
    use alloy_primitives::U256;

    fn validator() -> Validator {
        Validator::new(NetworkConfig::testnet())
    }

    fn intent(delegated: bool) -> ValidatedIntent {
        let mut builder = IntentBuilder::new(0x27)
            .block_ref(BlockRef::from_u64(0x0000_00aa_0000_0000))
            .transfer(Address::repeat_byte(0x44), U256::from(5u8))
            .dynamic_fee(U256::from(10_000_000_000_000u64), U256::from(100u64))
            .gas(21_000)
            .nonce(3);
        if delegated {
            builder = builder.delegated();
        }
        validator().validate(&builder.build()).unwrap()
    }

    // -- TxSignature -------------------------------------------------------

    #[test]
    fn signature_length_is_checked() {
        assert!(TxSignature::from_slice(&[0u8; 65]).is_ok());
        assert!(TxSignature::from_slice(&[0u8; 130]).is_ok());
        assert!(matches!(
            TxSignature::from_slice(&[0u8; 64]),
            Err(SigningError::InvalidLength { actual: 64 })
        ));
    }

    #[test]
    fn delegated_signature_splits() {
        let sig = TxSignature::delegated([1u8; 65], [2u8; 65]);
        assert!(sig.is_delegated());
        assert_eq!(sig.origin_part(), &[1u8; 65][..]);
        assert_eq!(sig.gas_payer_part(), Some(&[2u8; 65][..]));
        assert!(TxSignature::single([1u8; 65]).gas_payer_part().is_none());
    }

    // -- SignedTransaction -------------------------------------------------

    #[test]
    fn signed_roundtrip_through_bytes() {
        let signer = LocalSigner::random();
        let signed = intent(false).hashed().sign(&signer).unwrap();
        let raw = final_encode(&signed);

        let decoded = SignedTransaction::decode(&raw, &validator()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.origin().unwrap(), signer.address());
    }

    #[test]
    fn decoded_transaction_needs_a_matching_network() {
        let signer = LocalSigner::random();
        let signed = intent(false).hashed().sign(&signer).unwrap();
        let raw = final_encode(&signed);

        // Recovery works before validation.
        let decoded = DecodedTransaction::decode(&raw).unwrap();
        assert_eq!(decoded.origin().unwrap(), signer.address());
        assert_eq!(decoded.id().unwrap(), signed.id().unwrap());
        assert_eq!(decoded.encode(), raw);

        let mainnet = Validator::new(NetworkConfig::mainnet());
        assert!(matches!(
            decoded.clone().validate(&mainnet),
            Err(ValidationError::InvalidNetwork { .. })
        ));
        assert!(matches!(
            SignedTransaction::decode(&raw, &mainnet),
            Err(TxError::Validation(ValidationError::InvalidNetwork { .. }))
        ));
        assert_eq!(decoded.validate(&validator()).unwrap(), signed);
    }

    #[test]
    fn final_encode_is_deterministic() {
        let signer = LocalSigner::random();
        let signed = intent(false).hashed().sign(&signer).unwrap();
        assert_eq!(final_encode(&signed), final_encode(&signed));
    }

    #[test]
    fn unsigned_bytes_are_not_a_signed_transaction() {
        let raw = codec::encode_unsigned(&intent(false));
        assert!(matches!(
            SignedTransaction::decode(&raw, &validator()),
            Err(TxError::Codec(_))
        ));
        assert!(DecodedTransaction::decode(&raw).is_err());
    }

    #[test]
    fn id_binds_origin() {
        let a = intent(false).hashed().sign(&LocalSigner::random()).unwrap();
        let b = intent(false).hashed().sign(&LocalSigner::random()).unwrap();
        assert_eq!(a.signing_hash(), b.signing_hash());
        assert_ne!(a.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn shape_mismatch_is_reported() {
        // A single signature attached to a delegated body.
        let signer = LocalSigner::random();
        let v = intent(true);
        let sig = signer.sign_hash(&compute_signing_hash(&v)).unwrap();
        let tx = attach_signature(&v, TxSignature::single(sig));

        assert!(matches!(
            tx.origin(),
            Err(SigningError::DelegationMismatch {
                delegated: true,
                signature_len: 65
            })
        ));
        assert!(!tx.verify(&signer.address()));
    }

    #[test]
    fn raw_decode_tells_signed_from_unsigned() {
        let v = intent(false);
        let unsigned = codec::encode_unsigned(&v);
        let raw = RawTransaction::decode(&unsigned).unwrap();
        assert!(matches!(raw, RawTransaction::Unsigned(_)));
        assert_eq!(raw.body(), v.body());

        let signed = v.clone().hashed().sign(&LocalSigner::random()).unwrap();
        let raw = RawTransaction::decode(&final_encode(&signed)).unwrap();
        let RawTransaction::Signed(tx) = raw else {
            panic!("expected a signed transaction");
        };
        assert_eq!(tx.body().body(), v.body());
        assert_eq!(tx.signature(), signed.signature());
    }

    #[test]
    fn raw_hex_is_prefixed() {
        let signed = intent(false).hashed().sign(&LocalSigner::random()).unwrap();
        let hex = signed.raw_hex();
        assert!(hex.starts_with("0x51"));
    }

    #[test]
    fn delegated_roundtrip_keeps_both_signers() {
        let origin = LocalSigner::random();
        let payer = LocalSigner::random();
        let signed = intent(true).hashed().sign_delegated(&origin, &payer).unwrap();
        let decoded = SignedTransaction::decode(&final_encode(&signed), &validator()).unwrap();
        assert_eq!(decoded.origin().unwrap(), origin.address());
        assert_eq!(decoded.delegator().unwrap(), Some(payer.address()));
    }
}
