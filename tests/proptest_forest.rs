//! Property-based tests for the forest and the latency aggregation.
//!
//! These tests verify invariants that should hold for any valid input.

use iris_pipeline::client::summarize_latencies;
use iris_pipeline::dataset::{IrisDataset, N_CLASSES};
use iris_pipeline::forest::{ForestConfig, RandomForest};
use iris_pipeline::metrics::{accuracy_score, confusion_matrix};
use iris_pipeline::selection::train_test_split;
use proptest::prelude::*;

/// Strategy for a plausible feature vector.
fn feature_vector() -> impl Strategy<Value = [f64; 4]> {
    [0.0..10.0f64, 0.0..6.0f64, 0.0..8.0f64, 0.0..3.0f64]
}

fn tiny_forest() -> RandomForest {
    let data = IrisDataset::load().expect("bundled dataset");
    let config = ForestConfig {
        n_trees: 5,
        ..ForestConfig::default()
    };
    RandomForest::fit(&data.features, &data.labels, config).expect("fit")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: predictions are always a valid class id.
    #[test]
    fn prop_prediction_in_class_set(sample in feature_vector()) {
        let forest = tiny_forest();
        let predicted = forest.predict(&sample);
        prop_assert!(usize::from(predicted) < N_CLASSES);
    }

    /// Property: vote fractions are a probability distribution.
    #[test]
    fn prop_vote_fractions_normalized(sample in feature_vector()) {
        let forest = tiny_forest();
        let votes = forest.vote_fractions(&sample);
        let sum: f64 = votes.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!(votes.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    /// Property: batch prediction preserves order and length.
    #[test]
    fn prop_batch_matches_single(samples in prop::collection::vec(feature_vector(), 1..8)) {
        let forest = tiny_forest();
        let batch = forest.predict_batch(&samples);
        prop_assert_eq!(batch.len(), samples.len());
        for (sample, &predicted) in samples.iter().zip(&batch) {
            prop_assert_eq!(forest.predict(sample), predicted);
        }
    }

    /// Property: accuracy is bounded and the confusion matrix sums to
    /// the sample count.
    #[test]
    fn prop_metrics_consistent(
        labels in prop::collection::vec(0u8..3, 1..40),
        predictions in prop::collection::vec(0u8..3, 1..40),
    ) {
        let n = labels.len().min(predictions.len());
        let labels = &labels[..n];
        let predictions = &predictions[..n];

        let accuracy = accuracy_score(predictions, labels);
        prop_assert!((0.0..=1.0).contains(&accuracy));

        let matrix = confusion_matrix(predictions, labels);
        let total: usize = matrix.iter().flatten().sum();
        prop_assert_eq!(total, n);
    }

    /// Property: any split ratio keeps train and test disjoint and
    /// complete.
    #[test]
    fn prop_split_partitions(seed in 0u64..1000, ratio in 0.1f64..0.4) {
        let data = IrisDataset::load().expect("bundled dataset");
        let split = train_test_split(&data.labels, ratio, seed);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        all.dedup();
        prop_assert_eq!(all.len(), data.len());
    }

    /// Property: percentile stats stay ordered for any latency sample.
    #[test]
    fn prop_latency_stats_ordered(latencies in prop::collection::vec(0.01f64..500.0, 1..50)) {
        let summary = summarize_latencies(latencies.len(), &latencies, 0);
        let stats = summary.stats.expect("non-empty latencies");

        prop_assert!(stats.min_ms <= stats.p95_ms);
        prop_assert!(stats.p95_ms <= stats.p99_ms);
        prop_assert!(stats.p99_ms <= stats.max_ms);
        prop_assert!(stats.mean_ms >= 0.0);
    }

    /// Property: success counts always reconcile with the request total.
    #[test]
    fn prop_summary_counts_reconcile(
        successes in 0usize..20,
        failures in 0usize..20,
    ) {
        let latencies: Vec<f64> = (0..successes).map(|i| 1.0 + i as f64).collect();
        let summary = summarize_latencies(successes + failures, &latencies, failures);

        prop_assert_eq!(summary.successes + summary.failures, summary.total_requests);
        prop_assert!((0.0..=100.0).contains(&summary.success_rate));
        prop_assert_eq!(summary.stats.is_none(), successes == 0);
    }
}
