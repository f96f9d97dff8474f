//! Canonical binary encoding of transactions.
//!
//! The encoding is RLP. RLP strings and lists are length-prefixed and
//! integers are big-endian with no leading zeros, so every value has exactly
//! one encoding and a decoder always knows how many bytes to consume.
//!
//! ```text
//! legacy:   rlp([chain_tag, block_ref, expiration, clauses, gas_price_coef,
//!                gas, depends_on, nonce, reserved (, signature)])
//! dynamic:  0x51 || rlp([chain_tag, block_ref, expiration, clauses,
//!                max_priority_fee_per_gas, max_fee_per_gas,
//!                gas, depends_on, nonce, reserved (, signature)])
//!
//! clause:   [to | "", value, data]
//! reserved: [] when no feature bit is set, otherwise [features]
//! ```
//!
//! A legacy transaction starts with its list header (`0xc0..=0xff`); a
//! dynamic-fee transaction starts with the `0x51` marker. Decoding is strict:
//! anything that would not re-encode to the same bytes is rejected with
//! [`CodecError::MalformedEncoding`].
//!
//! Decoding proves structure only. A [`DecodedIntent`] says nothing about
//! the network it is meant for, so it cannot be signed until
//! [`Validator::revalidate`](super::Validator::revalidate) has checked it.

use alloy_primitives::{Bytes, B256, U256};
use alloy_rlp::{Decodable, Encodable, Header, EMPTY_STRING_CODE};
use serde::Serialize;
use std::ops::Deref;
use thiserror::Error;

use super::types::{BlockRef, Clause, Features, FeeModel};
use super::validation::TxBody;
use crate::config::{
    ADDRESS_LENGTH, DELEGATED_SIGNATURE_LENGTH, DYNAMIC_FEE_TX_TYPE, HASH_LENGTH, RLP_LIST_OFFSET,
    SIGNATURE_LENGTH,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Decoding failures. Encoding a body cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed encoding: {reason}")]
    MalformedEncoding { reason: String },
}

impl CodecError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            reason: reason.into(),
        }
    }
}

impl From<alloy_rlp::Error> for CodecError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::malformed(format!("rlp: {}", err))
    }
}

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Transaction envelope, determined by the first encoded byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Legacy,
    DynamicFee,
}

impl TxType {
    /// Identifies the envelope of `bytes` without decoding the body.
    pub fn detect(bytes: &[u8]) -> Result<Self, CodecError> {
        match bytes.first() {
            None => Err(CodecError::malformed("empty input")),
            Some(&DYNAMIC_FEE_TX_TYPE) => Ok(Self::DynamicFee),
            Some(&b) if b >= RLP_LIST_OFFSET => Ok(Self::Legacy),
            Some(&b) => Err(CodecError::malformed(format!(
                "unknown transaction type 0x{:02x}",
                b
            ))),
        }
    }

    fn of(fee: &FeeModel) -> Self {
        if fee.is_dynamic() {
            Self::DynamicFee
        } else {
            Self::Legacy
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes the unsigned body: the exact bytes the signing hash covers.
///
/// Accepts a [`ValidatedIntent`](super::ValidatedIntent) through `Deref`.
pub fn encode_unsigned(intent: &TxBody) -> Bytes {
    encode(intent, None)
}

/// Encodes the body with the signature appended as the final list element.
pub(crate) fn encode_signed(intent: &TxBody, signature: &[u8]) -> Bytes {
    encode(intent, Some(signature))
}

fn encode(intent: &TxBody, signature: Option<&[u8]>) -> Bytes {
    let mut payload = Vec::with_capacity(128 + intent.clauses().len() * 64);

    intent.chain_tag().encode(&mut payload);
    intent.block_ref().as_u64().encode(&mut payload);
    intent.expiration().encode(&mut payload);

    let mut clauses = Vec::new();
    for clause in intent.clauses() {
        encode_clause(clause, &mut clauses);
    }
    put_list(&clauses, &mut payload);

    match *intent.fee() {
        FeeModel::Legacy { gas_price_coef } => gas_price_coef.encode(&mut payload),
        FeeModel::Dynamic {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            max_priority_fee_per_gas.encode(&mut payload);
            max_fee_per_gas.encode(&mut payload);
        }
    }

    intent.gas().encode(&mut payload);
    match intent.depends_on() {
        Some(id) => put_bytes(id.as_slice(), &mut payload),
        None => payload.push(EMPTY_STRING_CODE),
    }
    intent.nonce().encode(&mut payload);
    encode_reserved(intent.features(), &mut payload);

    if let Some(sig) = signature {
        put_bytes(sig, &mut payload);
    }

    let mut out = Vec::with_capacity(payload.len() + 10);
    if TxType::of(intent.fee()) == TxType::DynamicFee {
        out.push(DYNAMIC_FEE_TX_TYPE);
    }
    put_list(&payload, &mut out);
    Bytes::from(out)
}

fn encode_clause(clause: &Clause, out: &mut Vec<u8>) {
    let mut payload = Vec::with_capacity(64 + clause.data.len());
    match &clause.to {
        Some(to) => put_bytes(to, &mut payload),
        None => payload.push(EMPTY_STRING_CODE),
    }
    clause.value.encode(&mut payload);
    put_bytes(&clause.data, &mut payload);
    put_list(&payload, out);
}

fn encode_reserved(features: Features, out: &mut Vec<u8>) {
    let mut payload = Vec::new();
    // Trailing zero values are trimmed, so no feature bits means `[]`.
    if features.0 != 0 {
        features.0.encode(&mut payload);
    }
    put_list(&payload, out);
}

fn put_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    <[u8] as Encodable>::encode(bytes, out);
}

fn put_list(payload: &[u8], out: &mut Vec<u8>) {
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(out);
    out.extend_from_slice(payload);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A body read back from bytes. Structurally canonical, not yet checked
/// against any network.
///
/// Fields are readable through `Deref` to [`TxBody`]. To sign or submit
/// it, pass it to [`Validator::revalidate`](super::Validator::revalidate).
///
/// ```compile_fail
/// # use vetx_protocol::transaction::{decode_unsigned, LocalSigner};
/// # fn sign(bytes: &[u8], signer: &LocalSigner) {
/// let decoded = decode_unsigned(bytes).unwrap();
/// decoded.hashed().sign(signer);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DecodedIntent(TxBody);

impl DecodedIntent {
    pub(crate) fn from_body(body: TxBody) -> Self {
        Self(body)
    }

    pub fn body(&self) -> &TxBody {
        &self.0
    }

    pub fn into_body(self) -> TxBody {
        self.0
    }
}

impl Deref for DecodedIntent {
    type Target = TxBody;

    fn deref(&self) -> &TxBody {
        &self.0
    }
}

/// Decodes an unsigned body produced by [`encode_unsigned`].
///
/// # Errors
///
/// [`CodecError::MalformedEncoding`] for truncated or trailing input,
/// non-canonical integers, unknown type markers, malformed recipients or
/// dependency ids, untrimmed or non-empty unused reserved slots, an empty
/// clause list, inconsistent dynamic fees, or a signature element.
pub fn decode_unsigned(bytes: &[u8]) -> Result<DecodedIntent, CodecError> {
    match decode(bytes)? {
        (body, None) => Ok(DecodedIntent::from_body(body)),
        (_, Some(_)) => Err(CodecError::malformed(
            "unexpected signature on unsigned transaction",
        )),
    }
}

/// Decodes a body that may carry a trailing signature element. The
/// signature, if present, has already been checked to be 65 or 130 bytes.
pub(crate) fn decode(bytes: &[u8]) -> Result<(TxBody, Option<Bytes>), CodecError> {
    let tx_type = TxType::detect(bytes)?;
    let mut buf = match tx_type {
        TxType::Legacy => bytes,
        TxType::DynamicFee => &bytes[1..],
    };

    let mut payload = take_list(&mut buf)?;
    if !buf.is_empty() {
        return Err(CodecError::malformed(format!(
            "{} trailing byte(s) after transaction",
            buf.len()
        )));
    }
    let p = &mut payload;

    let chain_tag = u8::decode(p)?;
    let block_ref = BlockRef::from_u64(u64::decode(p)?);
    let expiration = u32::decode(p)?;
    let clauses = decode_clauses(p)?;

    let fee = match tx_type {
        TxType::Legacy => FeeModel::Legacy {
            gas_price_coef: u8::decode(p)?,
        },
        TxType::DynamicFee => {
            let max_priority_fee_per_gas = U256::decode(p)?;
            let max_fee_per_gas = U256::decode(p)?;
            if max_priority_fee_per_gas > max_fee_per_gas {
                return Err(CodecError::malformed(
                    "max priority fee per gas exceeds max fee per gas",
                ));
            }
            FeeModel::Dynamic {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }
        }
    };

    let gas = u64::decode(p)?;
    let depends_on = decode_depends_on(p)?;
    let nonce = u64::decode(p)?;
    let features = decode_reserved(p)?;

    let signature = if p.is_empty() {
        None
    } else {
        let sig = Header::decode_bytes(p, false)?;
        if sig.len() != SIGNATURE_LENGTH && sig.len() != DELEGATED_SIGNATURE_LENGTH {
            return Err(CodecError::malformed(format!(
                "signature is {} bytes, expected {} or {}",
                sig.len(),
                SIGNATURE_LENGTH,
                DELEGATED_SIGNATURE_LENGTH
            )));
        }
        Some(Bytes::copy_from_slice(sig))
    };

    if !p.is_empty() {
        return Err(CodecError::malformed("unexpected extra transaction field"));
    }

    let body = TxBody::from_parts(
        chain_tag, block_ref, expiration, clauses, fee, gas, depends_on, nonce, features,
    );
    Ok((body, signature))
}

fn decode_clauses(buf: &mut &[u8]) -> Result<Vec<Clause>, CodecError> {
    let mut list = take_list(buf)?;
    let mut clauses = Vec::new();

    while !list.is_empty() {
        let mut c = take_list(&mut list)?;

        let to = match Header::decode_bytes(&mut c, false)? {
            [] => None,
            to if to.len() == ADDRESS_LENGTH => Some(Bytes::copy_from_slice(to)),
            to => {
                return Err(CodecError::malformed(format!(
                    "clause {}: recipient is {} bytes",
                    clauses.len(),
                    to.len()
                )))
            }
        };
        let value = U256::decode(&mut c)?;
        let data = Bytes::copy_from_slice(Header::decode_bytes(&mut c, false)?);

        if !c.is_empty() {
            return Err(CodecError::malformed(format!(
                "clause {}: unexpected extra field",
                clauses.len()
            )));
        }
        clauses.push(Clause { to, value, data });
    }

    if clauses.is_empty() {
        return Err(CodecError::malformed("transaction has no clauses"));
    }
    Ok(clauses)
}

fn decode_depends_on(buf: &mut &[u8]) -> Result<Option<B256>, CodecError> {
    match Header::decode_bytes(buf, false)? {
        [] => Ok(None),
        id if id.len() == HASH_LENGTH => Ok(Some(B256::from_slice(id))),
        id => Err(CodecError::malformed(format!(
            "depends_on is {} bytes, expected 0 or {}",
            id.len(),
            HASH_LENGTH
        ))),
    }
}

fn decode_reserved(buf: &mut &[u8]) -> Result<Features, CodecError> {
    let mut list = take_list(buf)?;
    let mut slots = Vec::new();
    while !list.is_empty() {
        slots.push(Header::decode_bytes(&mut list, false)?);
    }

    match slots.as_slice() {
        [] => Ok(Features::NONE),
        [.., last] if last.is_empty() => Err(CodecError::malformed("reserved field not trimmed")),
        [features] => Ok(Features(be_u32(features)?)),
        [_, unused @ ..] => Err(CodecError::malformed(format!(
            "reserved field has {} unused slot(s)",
            unused.len()
        ))),
    }
}

/// Parses a canonical big-endian integer that has already been unwrapped
/// from its RLP string header.
fn be_u32(bytes: &[u8]) -> Result<u32, CodecError> {
    if bytes.len() > 4 {
        return Err(CodecError::malformed("reserved features overflow u32"));
    }
    if bytes.first() == Some(&0) {
        return Err(CodecError::malformed("reserved features have a leading zero"));
    }
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

/// Consumes a list header and returns its payload, advancing `buf` past it.
fn take_list<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], CodecError> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(CodecError::malformed("expected a list"));
    }
    if buf.len() < header.payload_length {
        return Err(CodecError::malformed(format!(
            "list declares {} bytes but only {} remain",
            header.payload_length,
            buf.len()
        )));
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::transaction::builder::IntentBuilder;
    use crate::transaction::validation::{ValidatedIntent, ValidationError, Validator};
    use alloy_primitives::Address;

    fn recipient() -> Address {
        "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed".parse().unwrap()
    }

    fn testnet() -> Validator {
        Validator::new(NetworkConfig::testnet())
    }

    fn legacy() -> ValidatedIntent {
        let draft = IntentBuilder::new(0x27)
            .block_ref(BlockRef::from_u64(0x00aa_bbcc_dd00_0000))
            .expiration(32)
            .transfer(recipient(), U256::from(10_000_000_000_000_000_000u128))
            .gas_price_coef(128)
            .gas(21_000)
            .nonce(1)
            .build();
        Validator::new(NetworkConfig::testnet()).validate(&draft).unwrap()
    }

    fn dynamic() -> ValidatedIntent {
        let draft = IntentBuilder::new(0x27)
            .block_ref(BlockRef::from_u64(1))
            .call(recipient(), U256::ZERO, Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]))
            .clause(Clause::deploy(U256::from(1u8), Bytes::from_static(&[0x60, 0x80])))
            .dynamic_fee(U256::from(10_000_000_000_000u64), U256::from(100u64))
            .gas(100_000)
            .nonce(0)
            .depends_on(B256::repeat_byte(0xee))
            .delegated()
            .build();
        Validator::new(NetworkConfig::testnet()).validate(&draft).unwrap()
    }

    #[test]
    fn legacy_starts_with_list_header() {
        let bytes = encode_unsigned(&legacy());
        assert!(bytes[0] >= RLP_LIST_OFFSET);
        assert_eq!(TxType::detect(&bytes).unwrap(), TxType::Legacy);
    }

    #[test]
    fn dynamic_starts_with_type_marker() {
        let bytes = encode_unsigned(&dynamic());
        assert_eq!(bytes[0], DYNAMIC_FEE_TX_TYPE);
        assert_eq!(TxType::detect(&bytes).unwrap(), TxType::DynamicFee);
    }

    #[test]
    fn legacy_roundtrip() {
        let intent = legacy();
        let decoded = decode_unsigned(&encode_unsigned(&intent)).unwrap();
        assert_eq!(testnet().revalidate(&decoded).unwrap(), intent);
    }

    #[test]
    fn dynamic_roundtrip_with_dependency_and_delegation() {
        let intent = dynamic();
        let decoded = decode_unsigned(&encode_unsigned(&intent)).unwrap();
        assert_eq!(decoded.body(), intent.body());
        assert_eq!(decoded.depends_on(), Some(B256::repeat_byte(0xee)));
        assert!(decoded.is_delegated());
        assert!(decoded.clauses()[1].to.is_none());
    }

    #[test]
    fn reserved_is_empty_list_without_features() {
        let bytes = encode_unsigned(&legacy());
        // Last element of the body: an empty reserved list.
        assert_eq!(*bytes.last().unwrap(), 0xc0);
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            decode_unsigned(&[]),
            Err(CodecError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn unknown_type_marker_is_malformed() {
        let err = decode_unsigned(&[0x02, 0xc0]).unwrap_err();
        assert!(err.to_string().contains("unknown transaction type 0x02"));
    }

    #[test]
    fn truncated_input_is_malformed() {
        let bytes = encode_unsigned(&legacy());
        for cut in 0..bytes.len() {
            assert!(
                decode_unsigned(&bytes[..cut]).is_err(),
                "prefix of length {} must not decode",
                cut
            );
        }
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut bytes = encode_unsigned(&legacy()).to_vec();
        bytes.push(0x00);
        let err = decode_unsigned(&bytes).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn untrimmed_reserved_is_malformed() {
        let mut bytes = encode_unsigned(&legacy()).to_vec();
        // Replace the empty reserved list with `[""]` and patch the outer
        // header length (short list form, single-byte header).
        let last = bytes.len() - 1;
        bytes[last] = 0xc1;
        bytes.push(0x80);
        assert!(bytes[0] >= 0xc0 && bytes[0] <= 0xf7, "fixture uses a short list");
        bytes[0] += 1;
        let err = decode_unsigned(&bytes).unwrap_err();
        assert!(err.to_string().contains("not trimmed"));
    }

    #[test]
    fn unused_reserved_slot_is_malformed() {
        let mut bytes = encode_unsigned(&legacy()).to_vec();
        let last = bytes.len() - 1;
        // `[0x01, 0x01]`: delegation bit plus one unused slot.
        bytes[last] = 0xc2;
        bytes.extend_from_slice(&[0x01, 0x01]);
        bytes[0] += 2;
        let err = decode_unsigned(&bytes).unwrap_err();
        assert!(err.to_string().contains("unused"));
    }

    #[test]
    fn recipient_length_is_checked() {
        // Single clause with a 3-byte recipient, otherwise well-formed.
        let mut payload = Vec::new();
        0x27u8.encode(&mut payload);
        1u64.encode(&mut payload);
        32u32.encode(&mut payload);
        let mut clause = Vec::new();
        put_bytes(&[1, 2, 3], &mut clause);
        U256::ZERO.encode(&mut clause);
        put_bytes(&[], &mut clause);
        let mut clauses = Vec::new();
        put_list(&clause, &mut clauses);
        put_list(&clauses, &mut payload);
        0u8.encode(&mut payload);
        21_000u64.encode(&mut payload);
        payload.push(EMPTY_STRING_CODE);
        1u64.encode(&mut payload);
        put_list(&[], &mut payload);
        let mut bytes = Vec::new();
        put_list(&payload, &mut bytes);

        let err = decode_unsigned(&bytes).unwrap_err();
        assert!(err.to_string().contains("recipient is 3 bytes"));
    }

    #[test]
    fn unsigned_decoder_rejects_signature() {
        let intent = legacy();
        let signed = encode_signed(&intent, &[0u8; SIGNATURE_LENGTH]);
        assert!(decode_unsigned(&signed).is_err());
        let (decoded, sig) = decode(&signed).unwrap();
        assert_eq!(&decoded, intent.body());
        assert_eq!(sig.unwrap().len(), SIGNATURE_LENGTH);
    }

    #[test]
    fn odd_signature_length_is_malformed() {
        let signed = encode_signed(&legacy(), &[0u8; 64]);
        let err = decode(&signed).unwrap_err();
        assert!(err.to_string().contains("signature is 64 bytes"));
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode_unsigned(&legacy()), encode_unsigned(&legacy()));
    }

    #[test]
    fn different_nonce_different_bytes() {
        let a = legacy();
        let mut draft = a.to_intent();
        draft.nonce += 1;
        let b = testnet().validate(&draft).unwrap();
        assert_ne!(encode_unsigned(&a), encode_unsigned(&b));
    }

    /// Legacy body with one transfer clause and the given header fields.
    fn hand_encoded(chain_tag: u8, expiration: u32, gas: u64) -> Vec<u8> {
        let mut payload = Vec::new();
        chain_tag.encode(&mut payload);
        1u64.encode(&mut payload);
        expiration.encode(&mut payload);
        let mut clause = Vec::new();
        put_bytes(recipient().as_slice(), &mut clause);
        U256::from(1u8).encode(&mut clause);
        put_bytes(&[], &mut clause);
        let mut clauses = Vec::new();
        put_list(&clause, &mut clauses);
        put_list(&clauses, &mut payload);
        0u8.encode(&mut payload);
        gas.encode(&mut payload);
        payload.push(EMPTY_STRING_CODE);
        0u64.encode(&mut payload);
        put_list(&[], &mut payload);
        let mut bytes = Vec::new();
        put_list(&payload, &mut bytes);
        bytes
    }

    #[test]
    fn decoding_does_not_apply_network_policy() {
        // Well-formed bytes for an unknown chain with zero expiration and
        // zero gas: the decoder accepts them, the validator does not.
        let decoded = decode_unsigned(&hand_encoded(0x99, 0, 0)).unwrap();
        assert_eq!(decoded.chain_tag(), 0x99);
        assert_eq!(decoded.expiration(), 0);
        assert_eq!(decoded.gas(), 0);

        assert_eq!(
            testnet().revalidate(&decoded).unwrap_err(),
            ValidationError::InvalidNetwork {
                expected: 0x27,
                actual: 0x99
            }
        );

        // Even on a network with a matching tag, the remaining checks run.
        let own_network = Validator::new(NetworkConfig::custom(0x99));
        assert!(matches!(
            own_network.revalidate(&decoded).unwrap_err(),
            ValidationError::InvalidExpiration { expiration: 0, .. }
        ));
        let zero_gas = decode_unsigned(&hand_encoded(0x99, 32, 0)).unwrap();
        assert!(matches!(
            own_network.revalidate(&zero_gas).unwrap_err(),
            ValidationError::InsufficientGas { provided: 0, .. }
        ));

        let in_policy = decode_unsigned(&hand_encoded(0x99, 32, 21_000)).unwrap();
        let validated = own_network.revalidate(&in_policy).unwrap();
        assert_eq!(validated.body(), in_policy.body());
    }
}
