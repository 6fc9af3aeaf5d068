// In perfkey-core/benches/resolve_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use perfkey::{KeyMap, KeyMapConfig, StrategyTag};

// --- Key Sets, one per layout the cascade tends to pick ---

const TWO_KEYS: &[&str] = &["id", "age"];
const BYTE_KEYS: &[&str] = &["id", "name", "email", "phone", "address", "city", "zip"];
const LENGTH_KEYS: &[&str] = &["ab", "abc", "abcd", "abcde", "abcdef"];

/// A wider shape of similar names that defeats the single-column layouts.
fn wide_keys() -> Vec<String> {
    (0..64).map(|i| format!("field_{:02}_{}", i, i % 7)).collect()
}

/// Builds one JSON-like buffer per key: the key, the closing quote and a value.
fn buffers<S: AsRef<str>>(names: &[S]) -> Vec<Vec<u8>> {
    names
        .iter()
        .map(|name| format!("{}\": 12345, ", name.as_ref()).into_bytes())
        .collect()
}

// --- Benchmark Suite ---

fn bench_layout(c: &mut Criterion, label: &str, map: &KeyMap, inputs: &[Vec<u8>]) {
    let mut group = c.benchmark_group(format!("Resolve [{}]", label));
    group.throughput(Throughput::Elements(inputs.len() as u64));

    group.bench_function("resolve", |b| {
        b.iter(|| {
            for input in inputs {
                black_box(map.resolve(black_box(input)));
            }
        })
    });
    group.bench_function("find_in_buffer", |b| {
        b.iter(|| {
            for input in inputs {
                black_box(map.find_in_buffer(black_box(input)));
            }
        })
    });
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let config = KeyMapConfig::default();

    for names in [TWO_KEYS, BYTE_KEYS, LENGTH_KEYS] {
        let map = KeyMap::from_names(names, &config).unwrap();
        let label = map.strategy().tag().to_string();
        bench_layout(c, &label, &map, &buffers(names));
    }

    let wide = wide_keys();
    let map = KeyMap::from_names(&wide, &config).unwrap();
    bench_layout(c, &map.strategy().tag().to_string(), &map, &buffers(&wide));

    // The SIMD fallback on its own, regardless of what the cascade would pick.
    let simd_only = KeyMapConfig {
        skip_strategies: vec![
            StrategyTag::DoubleElement,
            StrategyTag::TripleElement,
            StrategyTag::SingleByte,
            StrategyTag::FirstByteAndUniqueIndex,
            StrategyTag::UniqueByteAndLength,
            StrategyTag::UniquePerLength,
        ],
        ..Default::default()
    };
    let map = KeyMap::from_names(BYTE_KEYS, &simd_only).unwrap();
    bench_layout(c, "simd_full_length (forced)", &map, &buffers(BYTE_KEYS));
}

fn bench_build(c: &mut Criterion) {
    let wide = wide_keys();
    c.bench_function("Build [64 keys]", |b| {
        b.iter(|| KeyMap::from_names(black_box(&wide), &KeyMapConfig::default()).unwrap())
    });
}

criterion_group!(benches, bench_resolve, bench_build);
criterion_main!(benches);
