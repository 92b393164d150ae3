//! Benchmarks for the terrain passes

use cavescan_algorithms::hydrology::{find_caves_with, map_drainage_with, CaveParams, DrainageParams};
use cavescan_algorithms::morphology::{morphological_filter, MorphologicalParams};
use cavescan_algorithms::pits::{correlation_pit_filter, CorrelationParams};
use cavescan_core::TerrainGrid;
use cavescan_parallel::{ProcessingMode, RowScheduler};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Rolling terrain with a scatter of small sinkholes and some noise
fn create_karst_grid(size: usize) -> TerrainGrid {
    TerrainGrid::from_fn(size, size, |x, y| {
        let (fx, fy) = (x as f64, y as f64);
        let rolling = 100.0 + (fx * 0.05).sin() * 8.0 + (fy * 0.07).cos() * 6.0;
        let sink = if x % 37 == 11 && y % 29 == 7 { -4.0 } else { 0.0 };
        let noise = ((x * 7 + y * 13) % 17) as f64 * 0.02;
        rolling + sink + noise
    })
    .unwrap()
}

fn bench_find_caves(c: &mut Criterion) {
    let scheduler = RowScheduler::new(ProcessingMode::Parallel).unwrap();
    let mut group = c.benchmark_group("hydrology/find_caves");
    group.sample_size(10);
    for size in [128, 256] {
        let grid = create_karst_grid(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| find_caves_with(black_box(&grid), CaveParams::with_depth(1.0), &scheduler).unwrap())
        });
    }
    group.finish();
}

fn bench_map_drainage(c: &mut Criterion) {
    let mut group = c.benchmark_group("hydrology/map_drainage");
    group.sample_size(10);
    for mode in [ProcessingMode::Sequential, ProcessingMode::Parallel] {
        let scheduler = RowScheduler::new(mode).unwrap();
        let grid = create_karst_grid(256);
        group.bench_with_input(BenchmarkId::new("256", format!("{:?}", mode)), &mode, |b, _| {
            b.iter(|| map_drainage_with(black_box(&grid), DrainageParams::default(), &scheduler).unwrap())
        });
    }
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let grid = create_karst_grid(512);
    c.bench_function("morphology/outlier_512", |b| {
        b.iter(|| morphological_filter(black_box(&grid), MorphologicalParams::default()).unwrap())
    });
    c.bench_function("pits/correlation_512", |b| {
        b.iter(|| correlation_pit_filter(black_box(&grid), CorrelationParams::default()).unwrap())
    });
}

criterion_group!(benches, bench_find_caves, bench_map_drainage, bench_filters);
criterion_main!(benches);
