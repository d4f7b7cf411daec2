//! Criterion benchmarks for the shot counter hot path.
//!
//! In `frames` tick mode the counter is updated from the frame-analysis task,
//! once per detection.  These benchmarks keep the tick and the statistics
//! snapshot honest as the classifier seam grows.
//!
//! Run with:
//! ```bash
//! cargo bench --package shot-core --bench counter_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shot_core::{Frame, ShotCounter};
use std::time::Duration;

fn bench_on_detection_tick(c: &mut Criterion) {
    c.bench_function("counter/on_detection_tick", |b| {
        let mut counter = ShotCounter::new();
        b.iter(|| {
            counter.on_detection_tick();
            black_box(&counter);
        })
    });
}

fn bench_stats_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter/stats");

    for ticks in [0u64, 1_000, 1_000_000] {
        let mut counter = ShotCounter::new();
        for _ in 0..ticks {
            counter.on_detection_tick();
        }
        group.bench_with_input(BenchmarkId::from_parameter(ticks), &counter, |b, counter| {
            b.iter(|| black_box(counter.stats()))
        });
    }

    group.finish();
}

fn bench_discard_frame(c: &mut Criterion) {
    c.bench_function("frame/discard_720p", |b| {
        b.iter(|| {
            let frame = Frame::blank(1, Duration::ZERO, 1280, 720);
            black_box(frame.discard())
        })
    });
}

criterion_group!(
    benches,
    bench_on_detection_tick,
    bench_stats_snapshot,
    bench_discard_frame,
);
criterion_main!(benches);
