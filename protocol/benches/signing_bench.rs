// Lifecycle benchmarks for vetx transactions.
//
// Covers validation, unsigned encoding, signing-hash computation, secp256k1
// signing, origin recovery, and decoding of signed transactions with a
// growing number of clauses.

use alloy_primitives::{Address, Bytes, U256};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vetx_protocol::config::NetworkConfig;
use vetx_protocol::transaction::{
    compute_signing_hash, encode_unsigned, final_encode, IntentBuilder, LocalSigner,
    SignedTransaction, TransactionIntent, Validator,
};

fn draft(clauses: usize) -> TransactionIntent {
    let mut builder = IntentBuilder::new(0x27)
        .gas_price_coef(128)
        .gas(5_000 + 16_000 * clauses as u64 + 68 * 4 * clauses as u64)
        .nonce(42);
    for i in 0..clauses {
        builder = builder.call(
            Address::repeat_byte(i as u8),
            U256::from(i),
            Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
        );
    }
    builder.build()
}

fn bench_validate(c: &mut Criterion) {
    let validator = Validator::new(NetworkConfig::testnet());
    let intent = draft(1);

    c.bench_function("tx/validate", |b| {
        b.iter(|| validator.validate(&intent).unwrap());
    });
}

fn bench_signing_hash(c: &mut Criterion) {
    let validated = Validator::new(NetworkConfig::testnet())
        .validate(&draft(1))
        .unwrap();

    c.bench_function("tx/encode_unsigned", |b| {
        b.iter(|| encode_unsigned(&validated));
    });
    c.bench_function("tx/signing_hash", |b| {
        b.iter(|| compute_signing_hash(&validated));
    });
}

fn bench_sign(c: &mut Criterion) {
    let signer = LocalSigner::random();
    let hashed = Validator::new(NetworkConfig::testnet())
        .validate(&draft(1))
        .unwrap()
        .hashed();

    c.bench_function("secp256k1/sign_transaction", |b| {
        b.iter(|| hashed.sign(&signer).unwrap());
    });

    let signed = hashed.sign(&signer).unwrap();
    c.bench_function("secp256k1/recover_origin", |b| {
        b.iter(|| signed.origin().unwrap());
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tx/decode_signed");
    let validator = Validator::new(NetworkConfig::testnet());
    let signer = LocalSigner::random();

    for clauses in [1usize, 10, 50] {
        let signed = validator
            .validate(&draft(clauses))
            .unwrap()
            .hashed()
            .sign(&signer)
            .unwrap();
        let raw = final_encode(&signed);

        group.throughput(Throughput::Elements(clauses as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clauses), &raw, |b, raw| {
            b.iter(|| SignedTransaction::decode(raw, &validator).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_validate,
    bench_signing_hash,
    bench_sign,
    bench_decode,
);
criterion_main!(benches);
