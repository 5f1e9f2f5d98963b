//! Benchmarks for cryptdrop-crypto

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cryptdrop_crypto::{
    envelope::{decrypt, EnvelopeCipher},
    hashing::sha256,
    keys::SymmetricKey,
};

fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let data = vec![0u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("sha256", size), &data, |b, data| {
            b.iter(|| sha256(data))
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let key = SymmetricKey::generate();
    let cipher = EnvelopeCipher::new(&key).unwrap();

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let data = vec![0u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("seal", size), &data, |b, data| {
            b.iter(|| cipher.seal(data).unwrap())
        });

        let sealed = cipher.seal(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("open", size), &sealed, |b, sealed| {
            b.iter(|| cipher.open(sealed.as_bytes()).unwrap())
        });
    }

    group.finish();
}

fn bench_key_setup(c: &mut Criterion) {
    c.bench_function("generate_key", |b| b.iter(SymmetricKey::generate));

    let key = SymmetricKey::generate();
    let sealed = cryptdrop_crypto::envelope::encrypt(&key, b"small").unwrap();
    c.bench_function("decrypt_small_with_setup", |b| {
        b.iter(|| decrypt(&key, sealed.as_bytes()).unwrap())
    });
}

criterion_group!(benches, bench_hashing, bench_envelope, bench_key_setup);
criterion_main!(benches);
