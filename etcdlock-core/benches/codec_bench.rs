use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use etcdlock_core::codec::{namespace, prefix_range_end};

fn bench_namespace(c: &mut Criterion) {
    c.bench_function("namespace_short_name", |b| {
        b.iter(|| namespace(black_box(b"etcdlock/"), black_box(b"orders")))
    });
}

fn bench_range_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_range_end");

    for trailing_max in [0usize, 8, 64] {
        let mut key = b"etcdlock/orders".to_vec();
        key.extend(std::iter::repeat(0xFF).take(trailing_max));

        group.bench_with_input(
            BenchmarkId::new("trailing_0xff", trailing_max),
            &key,
            |b, key| b.iter(|| prefix_range_end(black_box(key))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_namespace, bench_range_end);
criterion_main!(benches);
