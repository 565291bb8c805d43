//! Benchmarks for the driver pool and the dispatch path.
//!
//! Benchmarks cover:
//! - Uncontended add/take on the driver pool
//! - Contended take/return across threads
//! - Booking round trips through a region with zero-delay participants

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nuber_dispatch::builders::DispatcherBuilder;
use nuber_dispatch::core::DriverPool;
use nuber_dispatch::model::{Driver, Passenger};

// ============================================================================
// Driver Pool
// ============================================================================

fn bench_add_take(c: &mut Criterion) {
    let pool = DriverPool::new(16);
    pool.add(Driver::new("D0", Duration::ZERO)).unwrap();

    c.bench_function("driver_pool_take_add", |b| {
        b.iter(|| {
            let driver = pool.take();
            pool.add(black_box(driver)).unwrap();
        });
    });
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_pool_contended");
    for threads in [2_usize, 4, 8] {
        let rounds = 1_000_u64;
        group.throughput(Throughput::Elements(rounds * threads as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let pool = Arc::new(DriverPool::new(threads));
            for i in 0..threads / 2 {
                pool.add(Driver::new(format!("D{i}"), Duration::ZERO)).unwrap();
            }
            b.iter(|| {
                let workers: Vec<_> = (0..threads)
                    .map(|_| {
                        let pool = Arc::clone(&pool);
                        thread::spawn(move || {
                            for _ in 0..rounds {
                                let driver = pool.take();
                                pool.add(driver).unwrap();
                            }
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

// ============================================================================
// Dispatch
// ============================================================================

fn bench_booking_round_trip(c: &mut Criterion) {
    let dispatcher = DispatcherBuilder::new().region("Bench", 4).build().unwrap();
    for i in 0..4 {
        dispatcher.add_driver(Driver::new(format!("D{i}"), Duration::ZERO)).unwrap();
    }

    c.bench_function("booking_round_trip", |b| {
        b.iter(|| {
            let handle = dispatcher
                .book_passenger(Passenger::new("P", Duration::ZERO), "Bench")
                .unwrap()
                .unwrap();
            black_box(handle.wait().unwrap());
        });
    });
}

criterion_group!(benches, bench_add_take, bench_contended, bench_booking_round_trip);
criterion_main!(benches);
