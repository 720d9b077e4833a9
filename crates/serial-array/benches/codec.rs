//! Benchmarks for the serial array codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serial_array::{from_bytes, from_bytes_with_config, to_string, ParserConfig};

fn ids(n: i64) -> Vec<i64> {
    (0..n).map(|i| 30_000 + i * 7).collect()
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for n in [0i64, 10, 100, 1000] {
        let items = ids(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("list_{}", n), |b| {
            b.iter(|| to_string(black_box(&items)))
        });
    }

    group.finish();
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for n in [0i64, 10, 100, 1000] {
        let text = to_string(&ids(n)).unwrap();
        let data = text.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("list_{}", n), |b| {
            b.iter(|| from_bytes(black_box(data)))
        });
    }

    // Negative values exercise the sign branch.
    let negative = to_string(&(0..100).map(|i| -i * 1_000_003).collect::<Vec<i64>>()).unwrap();
    let negative = negative.as_bytes();
    group.throughput(Throughput::Bytes(negative.len() as u64));
    group.bench_function("negative_100", |b| {
        b.iter(|| from_bytes(black_box(negative)))
    });

    group.finish();
}

fn legacy_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("legacy");

    // Every third element removed without reindexing, header left stale.
    let dirty: String = {
        let items: String = (0..300)
            .filter(|i| i % 3 != 0)
            .map(|i| format!("i:{};i:{};", i, 30_000 + i))
            .collect();
        format!("a:300:{{{}}}", items)
    };
    let dirty = dirty.as_bytes();
    group.throughput(Throughput::Bytes(dirty.len() as u64));
    group.bench_function("dirty_300_lenient", |b| {
        b.iter(|| from_bytes_with_config(black_box(dirty), ParserConfig::lenient()))
    });

    // Nested array (depth 50)
    let nested: String = {
        let mut s = String::from("a:1:{i:0;i:1;}");
        for _ in 0..50 {
            s = format!("a:2:{{i:0;i:0;i:1;{}}}", s);
        }
        s
    };
    let nested = nested.as_bytes();
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("depth_50", |b| {
        b.iter(|| from_bytes(black_box(nested)))
    });

    group.finish();
}

criterion_group!(benches, encode, decode, legacy_rows);
criterion_main!(benches);
