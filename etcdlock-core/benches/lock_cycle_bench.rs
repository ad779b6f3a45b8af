use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use etcdlock_core::infrastructure_in_memory::InMemoryCoordinator;
use etcdlock_core::{LockClient, LockConfig};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("tokio runtime")
}

fn bench_acquire_release(c: &mut Criterion) {
    let rt = runtime();
    let store = Arc::new(InMemoryCoordinator::new());
    let client = LockClient::with_service(LockConfig::default(), store).expect("client");

    c.bench_function("acquire_release_cycle", |b| {
        b.to_async(&rt).iter(|| async {
            let handle = client.acquire("orders").await.expect("acquire");
            handle.unlock().await.expect("unlock");
        })
    });
}

fn bench_is_locked(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("is_locked");

    for held in [10usize, 100, 1000] {
        let store = Arc::new(InMemoryCoordinator::new());
        let client = LockClient::with_service(LockConfig::default(), store).expect("client");

        // Each lock on a different name
        let handles: Vec<_> = rt.block_on(async {
            let mut handles = Vec::with_capacity(held);
            for i in 0..held {
                handles.push(client.acquire(format!("job-{i}")).await.expect("acquire"));
            }
            handles
        });

        group.bench_with_input(BenchmarkId::new("held", held), &client, |b, client| {
            b.to_async(&rt)
                .iter(|| async { black_box(client.is_locked("job-7").await.expect("query")) })
        });

        drop(handles);
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_is_locked);
criterion_main!(benches);
