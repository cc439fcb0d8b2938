use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use aesgcm::aes::{generate_key, generate_key_for, AesGcm, KeySize};

fn encryption_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("aes-gcm-encrypt");

    let medium_data = vec![0u8; 1000]; // 1KB
    let large_data = vec![0u8; 1_000_000]; // 1MB

    for key_size in KeySize::ALL {
        let key = generate_key_for(key_size).unwrap();
        let cipher = AesGcm::new(key.as_bytes()).unwrap();

        for data in [&medium_data, &large_data] {
            group.throughput(Throughput::Bytes(data.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(key_size.to_string(), data.len()),
                data,
                |b, data| b.iter(|| cipher.encrypt(data)),
            );
        }
    }

    group.finish();
}

fn decryption_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("aes-gcm-decrypt");

    let medium_data = vec![0u8; 1000];
    let large_data = vec![0u8; 1_000_000];

    for key_size in KeySize::ALL {
        let key = generate_key_for(key_size).unwrap();
        let cipher = AesGcm::new(key.as_bytes()).unwrap();

        for data in [&medium_data, &large_data] {
            let ciphertext = cipher.encrypt(data).unwrap();

            group.throughput(Throughput::Bytes(data.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(key_size.to_string(), data.len()),
                &ciphertext,
                |b, ciphertext| b.iter(|| cipher.decrypt(ciphertext)),
            );
        }
    }

    group.finish();
}

fn key_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("keys");

    group.bench_function("generate_key_32", |b| b.iter(|| generate_key(32)));

    // Cipher setup runs the AES key schedule
    let key = generate_key(32).unwrap();
    group.bench_function("cipher_new_32", |b| {
        b.iter(|| AesGcm::new(key.as_bytes()))
    });

    group.finish();
}

criterion_group!(
    benches,
    encryption_benchmarks,
    decryption_benchmarks,
    key_benchmarks
);
criterion_main!(benches);
