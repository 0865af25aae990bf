#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};
use hotstuff_crypto::{keccak256::Keccak256, secp256k1::SecretKey};
use rand::Rng;
use std::iter::repeat_with;

fn bench_secp256k1(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("secp256k1");
    let hash = Keccak256::new(&rng.gen::<[u8; 32]>());
    group.bench_function("sign", |b| {
        let sk = SecretKey::generate();
        b.iter(|| sk.sign_hash(hash.as_bytes()).unwrap());
    });
    group.bench_function("verify 100 partial signatures", |b| {
        let sks: Vec<SecretKey> = repeat_with(SecretKey::generate).take(100).collect();
        let sigs: Vec<_> = sks
            .iter()
            .map(|sk| (sk.public(), sk.sign_hash(hash.as_bytes()).unwrap()))
            .collect();
        b.iter(|| {
            for (pk, sig) in &sigs {
                sig.verify_hash(hash.as_bytes(), pk).unwrap();
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_secp256k1);
criterion_main!(benches);
