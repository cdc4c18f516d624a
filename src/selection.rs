//! Seeded, stratified data splitting and cross-validation.
//!
//! Both operations shuffle each class's indices with an `StdRng` seeded
//! from the caller's seed, so repeated runs produce identical partitions.

use crate::dataset::{N_CLASSES, N_FEATURES};
use crate::error::Result;
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics::accuracy_score;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Index sets from a stratified train/test split.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified train/test split over labels.
///
/// Each class contributes `test_ratio` of its samples to the test set
/// (rounded down), so the class balance of the full dataset is preserved
/// on both sides.
#[must_use]
pub fn train_test_split(labels: &[u8], test_ratio: f64, seed: u64) -> TrainTestSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in 0..N_CLASSES as u8 {
        let mut class_indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        class_indices.shuffle(&mut rng);

        let n_test = (class_indices.len() as f64 * test_ratio).floor() as usize;
        test.extend_from_slice(&class_indices[..n_test]);
        train.extend_from_slice(&class_indices[n_test..]);
    }

    TrainTestSplit { train, test }
}

/// Stratified k-fold partition: each fold holds a near-equal share of
/// every class, dealt round-robin after a seeded per-class shuffle.
#[must_use]
pub fn stratified_kfold(labels: &[u8], k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];

    for class in 0..N_CLASSES as u8 {
        let mut class_indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        class_indices.shuffle(&mut rng);

        for (pos, idx) in class_indices.into_iter().enumerate() {
            folds[pos % k].push(idx);
        }
    }

    folds
}

/// Per-fold held-out accuracy of a forest fitted on the remaining folds.
///
/// # Errors
///
/// Propagates fit errors; a shape mismatch in any fold aborts the run.
pub fn cross_val_accuracy(
    features: &[[f64; N_FEATURES]],
    labels: &[u8],
    config: ForestConfig,
    k: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    let folds = stratified_kfold(labels, k, seed);
    let mut scores = Vec::with_capacity(k);

    for (fold_idx, held_out) in folds.iter().enumerate() {
        let train_indices: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != fold_idx)
            .flat_map(|(_, f)| f.iter().copied())
            .collect();
        let train_features: Vec<[f64; N_FEATURES]> =
            train_indices.iter().map(|&i| features[i]).collect();
        let train_labels: Vec<u8> = train_indices.iter().map(|&i| labels[i]).collect();

        let forest = RandomForest::fit(&train_features, &train_labels, config)?;

        let test_features: Vec<[f64; N_FEATURES]> =
            held_out.iter().map(|&i| features[i]).collect();
        let test_labels: Vec<u8> = held_out.iter().map(|&i| labels[i]).collect();
        let predictions = forest.predict_batch(&test_features);

        scores.push(accuracy_score(&predictions, &test_labels));
    }

    Ok(scores)
}
