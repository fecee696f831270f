use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mxp_storage::{FileStore, HostStore, MemoryStore, NamespacedStore, envelope, transform};
use serde_json::{Value, json};
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

fn payload(entries: usize) -> Value {
    let items: Vec<Value> = (0..entries)
        .map(|i| json!({ "id": i, "name": format!("item-{i}"), "tags": ["a", "b"] }))
        .collect();
    json!({ "items": items })
}

const SIZES: [(&str, usize); 3] = [("small", 1), ("medium", 32), ("large", 512)];

// ============================================================================
// Benchmark: Obfuscation Cipher
// ============================================================================

fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher");

    for (name, entries) in SIZES {
        let text = envelope::encode(&payload(entries), None).unwrap();
        group.throughput(Throughput::Bytes(u64::try_from(text.len()).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("transform", name), &text, |b, text| {
            b.iter(|| black_box(transform("_MXP_ENCRYPT_", text)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Envelope Codec
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    for (name, entries) in SIZES {
        let value = payload(entries);
        let text = envelope::encode(&value, Some(4_000_000_000_000)).unwrap();
        group.throughput(Throughput::Bytes(u64::try_from(text.len()).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("encode", name), &value, |b, value| {
            b.iter(|| black_box(envelope::encode(value, Some(4_000_000_000_000)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode", name), &text, |b, text| {
            b.iter(|| black_box(envelope::decode::<Value>(text, 1_700_000_000_000)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Namespaced Operations
// ============================================================================

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operations");
    let value = payload(8);

    let store =
        NamespacedStore::builder().host(MemoryStore::new()).group("bench").build().unwrap();
    store.set("hot", &value, None).unwrap();
    store.set_encrypted("hot_enc", &value, None).unwrap();

    group.bench_function("set", |b| b.iter(|| store.set("k", black_box(&value), None).unwrap()));
    group.bench_function("get", |b| b.iter(|| black_box(store.get::<Value>("hot"))));
    group.bench_function("set_encrypted", |b| {
        b.iter(|| store.set_encrypted("k", black_box(&value), None).unwrap());
    });
    group.bench_function("get_encrypted", |b| {
        b.iter(|| black_box(store.get_encrypted::<Value>("hot_enc")));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Scoped Deletion
// ============================================================================

fn bench_scoped_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoped_deletion");

    for keys in [100_usize, 1_000] {
        group.bench_with_input(BenchmarkId::new("delete_group", keys), &keys, |b, &keys| {
            b.iter_batched(
                || {
                    let host = MemoryStore::new();
                    for i in 0..keys {
                        host.write(&format!("foreign{i}"), "{}").unwrap();
                    }
                    let store = NamespacedStore::builder().host(host).group("g").build().unwrap();
                    for i in 0..keys {
                        store.set(i, &i, None).unwrap();
                    }
                    store
                },
                |store| black_box(store.delete_group(None).unwrap()),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Durable Writes
// ============================================================================

fn bench_file_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_store");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let host = FileStore::builder().path(temp.path().join("local.json")).open().unwrap();
    let store = NamespacedStore::new(host);

    let mut counter = 0_u64;
    group.bench_function("atomic_set", |b| {
        b.iter(|| {
            counter += 1;
            store.set(counter % 16, black_box(&counter), None).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_cipher,
    bench_envelope,
    bench_operations,
    bench_scoped_deletion,
    bench_file_store,
);

criterion_main!(benches);
