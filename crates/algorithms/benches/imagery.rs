//! Benchmarks for per-scene index computation and classification

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use greentrend_algorithms::imagery::{normalized_difference, water_mask, Classifier, ClassifyParams};
use greentrend_core::Raster;

fn create_band(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64 / 1000.0;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_normalized_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/normalized_difference");
    for size in [256, 512, 1024, 2048] {
        let nir = create_band(size, 0.3);
        let red = create_band(size, 0.1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| normalized_difference(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/classify");
    let date = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
    let classifier = Classifier::new(ClassifyParams::default()).unwrap();
    for size in [256, 512, 1024, 2048] {
        let vegetation = normalized_difference(&create_band(size, 0.3), &create_band(size, 0.1)).unwrap();
        let water = normalized_difference(&create_band(size, 0.1), &create_band(size, 0.3)).unwrap();
        let mask = water_mask(&water, 0.0).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classifier.classify(date, black_box(&vegetation), black_box(&mask)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalized_difference, bench_classify);
criterion_main!(benches);
