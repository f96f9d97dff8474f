use alloy_primitives::{Address, Bytes, B256, U256};
use proptest::prelude::*;

use vetx_protocol::config::{GasSchedule, NetworkConfig, CHAIN_TAG_TESTNET};
use vetx_protocol::transaction::{
    compute_signing_hash, decode_unsigned, encode_unsigned, intrinsic_gas, Clause, FeeModel,
    IntentBuilder, TransactionIntent, Validator,
};

/// Strategy for a clause: transfer, call or deployment.
fn arb_clause() -> impl Strategy<Value = Clause> {
    (
        prop::option::of(prop::array::uniform20(any::<u8>())),
        any::<u128>(),
        prop::collection::vec(any::<u8>(), 0..48),
    )
        .prop_map(|(to, value, data)| Clause {
            to: to.map(|a| Bytes::copy_from_slice(Address::from(a).as_slice())),
            value: U256::from(value),
            data: Bytes::from(data),
        })
}

fn arb_fee() -> impl Strategy<Value = FeeModel> {
    prop_oneof![
        any::<u8>().prop_map(|gas_price_coef| FeeModel::Legacy { gas_price_coef }),
        (any::<u128>(), any::<u128>()).prop_map(|(a, b)| FeeModel::Dynamic {
            max_fee_per_gas: U256::from(a.max(b)),
            max_priority_fee_per_gas: U256::from(a.min(b)),
        }),
    ]
}

/// Strategy for a draft that passes testnet validation.
fn arb_intent() -> impl Strategy<Value = TransactionIntent> {
    (
        any::<u64>(),                              // block ref
        1u32..=720,                                // expiration
        prop::collection::vec(arb_clause(), 1..4), // clauses
        arb_fee(),
        0u64..100_000,                             // gas above intrinsic
        prop::option::of(prop::array::uniform32(any::<u8>())),
        any::<u64>(),                              // nonce
        any::<bool>(),                             // delegated
    )
        .prop_map(
            |(block_ref, expiration, clauses, fee, extra_gas, depends_on, nonce, delegated)| {
                let gas = intrinsic_gas(&GasSchedule::default(), &clauses) + extra_gas;
                let mut builder = IntentBuilder::new(CHAIN_TAG_TESTNET)
                    .block_ref(vetx_protocol::transaction::BlockRef::from_u64(block_ref))
                    .expiration(expiration)
                    .fee_model(fee)
                    .gas(gas)
                    .nonce(nonce);
                for clause in clauses {
                    builder = builder.clause(clause);
                }
                if let Some(id) = depends_on {
                    builder = builder.depends_on(B256::from(id));
                }
                if delegated {
                    builder = builder.delegated();
                }
                builder.build()
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unsigned_encoding_roundtrip(intent in arb_intent()) {
        let validator = Validator::new(NetworkConfig::testnet());
        let validated = validator.validate(&intent).unwrap();
        let decoded = decode_unsigned(&encode_unsigned(&validated)).unwrap();
        prop_assert_eq!(validator.revalidate(&decoded).unwrap(), validated);
    }

    #[test]
    fn signing_hash_is_stable(intent in arb_intent()) {
        let validated = Validator::new(NetworkConfig::testnet()).validate(&intent).unwrap();
        prop_assert_eq!(compute_signing_hash(&validated), compute_signing_hash(&validated.clone()));
    }

    #[test]
    fn every_strict_prefix_is_malformed(intent in arb_intent()) {
        let validated = Validator::new(NetworkConfig::testnet()).validate(&intent).unwrap();
        let encoded = encode_unsigned(&validated);
        for len in 0..encoded.len() {
            prop_assert!(decode_unsigned(&encoded[..len]).is_err());
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_unsigned(&bytes);
    }
}
