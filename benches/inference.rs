//! Inference performance benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iris_pipeline::dataset::IrisDataset;
use iris_pipeline::forest::{ForestConfig, RandomForest};

fn fitted_forest(n_trees: usize) -> RandomForest {
    let data = IrisDataset::load().expect("bundled dataset");
    let config = ForestConfig {
        n_trees,
        ..ForestConfig::default()
    };
    RandomForest::fit(&data.features, &data.labels, config).expect("fit")
}

fn benchmark_single_prediction(c: &mut Criterion) {
    let forest = fitted_forest(100);
    let sample = [6.2, 2.9, 4.3, 1.3];

    c.bench_function("predict_single", |b| {
        b.iter(|| black_box(forest.predict(black_box(&sample))));
    });
}

fn benchmark_batch_prediction(c: &mut Criterion) {
    let forest = fitted_forest(100);
    let data = IrisDataset::load().expect("bundled dataset");

    c.bench_function("predict_batch_150", |b| {
        b.iter(|| black_box(forest.predict_batch(black_box(&data.features))));
    });
}

fn benchmark_forest_fit(c: &mut Criterion) {
    let data = IrisDataset::load().expect("bundled dataset");
    let config = ForestConfig {
        n_trees: 10,
        ..ForestConfig::default()
    };

    c.bench_function("fit_10_trees", |b| {
        b.iter(|| {
            let forest =
                RandomForest::fit(black_box(&data.features), black_box(&data.labels), config)
                    .expect("fit");
            black_box(forest.n_trees())
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_prediction,
    benchmark_batch_prediction,
    benchmark_forest_fit
);
criterion_main!(benches);
