//! Benchmarks for the admission scheduler.
//!
//! Benchmarks cover:
//! - Username to scope-key hashing
//! - Scheduler start, fast-path admission and shutdown
//! - Shutdown cost with many pending waiters

use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use prometheus_admission::config::SchedulerSettings;
use prometheus_admission::core::{CancelToken, RequestScheduler, ScopeKey};
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::runtime::Runtime;

fn random_name(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

// ============================================================================
// Scope resolution
// ============================================================================

fn bench_scope_from_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_from_name");

    for len in [8_usize, 32, 128] {
        let names: Vec<String> = (0..256).map(|_| format!("@{}", random_name(len))).collect();
        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &names, |b, names| {
            b.iter(|| {
                for name in names {
                    black_box(ScopeKey::from_name(name));
                }
            });
        });
    }
    group.finish();
}

// ============================================================================
// Scheduler lifecycle
// ============================================================================

fn bench_start_admit_stop(c: &mut Criterion) {
    let settings = SchedulerSettings::default();
    // Stay within the idle burst so nothing waits on the clock.
    let burst = i64::from(settings.reset_threshold);

    c.bench_function("start_admit_stop", |b| {
        b.iter(|| {
            let scheduler = RequestScheduler::new(settings.clone()).unwrap();
            let cancel = CancelToken::new();
            for chat in 1..=burst {
                scheduler.admit_blocking(chat, &cancel).unwrap();
            }
            scheduler.stop();
        });
    });
}

fn bench_stop_with_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("stop_with_pending");
    group.sample_size(20);

    for pending in [10_u64, 100, 1_000] {
        group.throughput(Throughput::Elements(pending));
        group.bench_with_input(
            BenchmarkId::from_parameter(pending),
            &pending,
            |b, &pending| {
                b.to_async(Runtime::new().unwrap()).iter_custom(|iters| async move {
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let scheduler =
                            Arc::new(RequestScheduler::new(SchedulerSettings::default()).unwrap());
                        scheduler.admit(-1_i64, &CancelToken::new()).await.unwrap();

                        let waiters: Vec<_> = (0..pending)
                            .map(|_| {
                                let scheduler = Arc::clone(&scheduler);
                                tokio::spawn(async move {
                                    scheduler.admit(-1_i64, &CancelToken::new()).await
                                })
                            })
                            .collect();
                        while scheduler.stats().queued_waiters < usize::try_from(pending).unwrap() {
                            tokio::task::yield_now().await;
                        }

                        let start = Instant::now();
                        scheduler.stop();
                        for waiter in futures::future::join_all(waiters).await {
                            black_box(waiter.unwrap().unwrap_err());
                        }
                        total += start.elapsed();
                    }
                    total
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_scope_from_name,
    bench_start_admit_stop,
    bench_stop_with_pending
);
criterion_main!(benches);
