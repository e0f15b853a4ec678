use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use turnstile::Strategy;

trait BarrierLike: Sync {
    fn wait(&self);
}

impl BarrierLike for turnstile::Barrier {
    fn wait(&self) {
        turnstile::Barrier::wait(self);
    }
}

impl BarrierLike for std::sync::Barrier {
    fn wait(&self) {
        std::sync::Barrier::wait(self);
    }
}

fn run_rounds<B: BarrierLike>(n_threads: usize, rounds: usize, b: &B) {
    crossbeam_utils::thread::scope(|s| {
        for _ in 0..n_threads {
            s.spawn(|_| {
                for _ in 0..rounds {
                    b.wait();
                }
            });
        }
    })
    .unwrap();
}

const ROUNDS: usize = 100;

fn bench_turnstile(strategy: Strategy, n_threads: usize) -> Duration {
    let start = Instant::now();
    let b = turnstile::Barrier::with_strategy(n_threads, strategy).unwrap();
    run_rounds(n_threads, ROUNDS, &b);
    drop(b);
    start.elapsed()
}

fn bench_std(n_threads: usize) -> Duration {
    let start = Instant::now();
    let b = std::sync::Barrier::new(n_threads);
    run_rounds(n_threads, ROUNDS, &b);
    start.elapsed()
}

// Participants are clones, so every thread owns its own copy.
fn bench_adaptive(n_threads: usize) -> Duration {
    let start = Instant::now();
    let b = adaptive_barrier::Barrier::new(adaptive_barrier::PanicMode::Decrement);
    let clones: Vec<_> = (1..n_threads).map(|_| b.clone()).collect();
    let handles: Vec<_> = clones
        .into_iter()
        .map(|mut b| {
            std::thread::spawn(move || {
                for _ in 0..ROUNDS {
                    b.wait();
                }
            })
        })
        .collect();
    let mut b = b;
    for _ in 0..ROUNDS {
        b.wait();
    }
    for h in handles {
        h.join().unwrap();
    }
    start.elapsed()
}

fn bench_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("{ROUNDS} rounds"));
    for n_threads in [2, 4, 8, 16] {
        for strategy in Strategy::ALL {
            group.bench_with_input(
                BenchmarkId::new(format!("Turnstile ({strategy})"), n_threads),
                &n_threads,
                |b, i| b.iter(|| bench_turnstile(strategy, *i)),
            );
        }
        group.bench_with_input(BenchmarkId::new("Std", n_threads), &n_threads, |b, i| {
            b.iter(|| bench_std(*i))
        });
        group.bench_with_input(BenchmarkId::new("Adaptive", n_threads), &n_threads, |b, i| {
            b.iter(|| bench_adaptive(*i))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_threads);
criterion_main!(benches);
