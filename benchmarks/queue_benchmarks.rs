use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qbroker::Broker;
use tokio::runtime::Runtime;

/// Benchmark: enqueue on one queue from one thread
fn bench_enqueue_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_single_thread");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("1000_messages", |b| {
        let broker = Broker::new();
        b.iter(|| {
            for _ in 0..1000 {
                broker.enqueue("bench", black_box("payload"));
            }
        });
    });
    group.finish();
}

/// Benchmark: non-blocking dequeue fast path
fn bench_dequeue_fast_path(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("dequeue_fast_path");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("fill_then_drain", |b| {
        b.iter(|| {
            rt.block_on(async {
                let broker = Broker::new();
                for _ in 0..1000 {
                    broker.enqueue("bench", "payload");
                }
                for _ in 0..1000 {
                    let _ = black_box(broker.dequeue("bench", Duration::ZERO).await);
                }
            });
        });
    });
    group.finish();
}

/// Benchmark: blocked consumers woken by producers
fn bench_wake_handoff(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("wake_handoff");
    group.sample_size(50);

    for consumers in [1usize, 4, 16] {
        group.throughput(Throughput::Elements((consumers * 100) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(consumers),
            &consumers,
            |b, &consumers| {
                b.iter(|| {
                    rt.block_on(async {
                        let broker = Arc::new(Broker::new());
                        let handles: Vec<_> = (0..consumers)
                            .map(|_| {
                                let broker = broker.clone();
                                tokio::spawn(async move {
                                    for _ in 0..100 {
                                        let _ = black_box(
                                            broker.dequeue("bench", Duration::from_secs(1)).await,
                                        );
                                    }
                                })
                            })
                            .collect();

                        for _ in 0..consumers * 100 {
                            broker.enqueue("bench", "payload");
                            tokio::task::yield_now().await;
                        }
                        for handle in handles {
                            handle.await.unwrap();
                        }
                    });
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: producers spread over many queue names
fn bench_concurrent_producers(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("concurrent_producers");

    for producers in [2usize, 8] {
        group.throughput(Throughput::Elements((producers * 1000) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    rt.block_on(async {
                        let broker = Arc::new(Broker::new());
                        let handles: Vec<_> = (0..producers)
                            .map(|p| {
                                let broker = broker.clone();
                                tokio::spawn(async move {
                                    let name = format!("bench-{}", p % 4);
                                    for _ in 0..1000 {
                                        broker.enqueue(&name, black_box("payload"));
                                    }
                                })
                            })
                            .collect();
                        for handle in handles {
                            handle.await.unwrap();
                        }
                    });
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_enqueue_single_thread,
    bench_dequeue_fast_path,
    bench_wake_handoff,
    bench_concurrent_producers,
);

criterion_main!(benches);
