//! Random forest classifier over fixed-length feature vectors.
//!
//! Trees are stored as flat node vectors and grown by recursive gini
//! splitting. The forest bags bootstrap samples and subsamples features at
//! each split; every stochastic choice is driven by an `StdRng` derived
//! from the configured seed, so fitting is fully deterministic.

use crate::dataset::{N_CLASSES, N_FEATURES};
use crate::error::{PipelineError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Hyperparameters for forest fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples each side of a split must retain.
    pub min_samples_leaf: usize,
    /// Base RNG seed; tree `t` uses `seed + t`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// One node of a decision tree.
///
/// Internal nodes carry `feature_idx` and both children; leaves carry only
/// the majority-class prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    feature_idx: Option<usize>,
    threshold: f64,
    left: Option<usize>,
    right: Option<usize>,
    prediction: u8,
}

/// A single decision tree as a flat node vector rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn predict(&self, sample: &[f64; N_FEATURES]) -> u8 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            match (node.feature_idx, node.left, node.right) {
                (Some(feature), Some(left), Some(right)) => {
                    node_idx = if sample[feature] <= node.threshold {
                        left
                    } else {
                        right
                    };
                }
                _ => return node.prediction,
            }
            if node_idx >= self.nodes.len() {
                return self.nodes[0].prediction;
            }
        }
    }
}

/// A fitted ensemble of decision trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on the given feature matrix and label vector.
    ///
    /// # Errors
    ///
    /// Returns a `DimensionMismatch` error when the matrix and label
    /// shapes disagree or the training set is empty. Shape errors are
    /// fatal to the trainer pipeline.
    pub fn fit(
        features: &[[f64; N_FEATURES]],
        labels: &[u8],
        config: ForestConfig,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(PipelineError::dimension_mismatch(
                format!("{} labels", features.len()),
                format!("{} labels", labels.len()),
            ));
        }
        if features.is_empty() {
            return Err(PipelineError::dimension_mismatch(
                "at least 1 sample",
                "0 samples",
            ));
        }

        let n = features.len();
        let mut trees = Vec::with_capacity(config.n_trees);

        for t in 0..config.n_trees {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));

            // Bootstrap sample with replacement.
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut nodes = Vec::new();
            build_node(features, labels, &indices, 0, &config, &mut rng, &mut nodes);
            trees.push(DecisionTree { nodes });
        }

        Ok(Self { config, trees })
    }

    /// Predict the class of one sample by majority vote.
    #[must_use]
    pub fn predict(&self, sample: &[f64; N_FEATURES]) -> u8 {
        let votes = self.vote_fractions(sample);
        let mut best = 0;
        for class in 1..N_CLASSES {
            if votes[class] > votes[best] {
                best = class;
            }
        }
        best as u8
    }

    /// Predict classes for a batch of samples, order-preserving.
    #[must_use]
    pub fn predict_batch(&self, samples: &[[f64; N_FEATURES]]) -> Vec<u8> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Fraction of trees voting for each class.
    #[must_use]
    pub fn vote_fractions(&self, sample: &[f64; N_FEATURES]) -> [f64; N_CLASSES] {
        let mut counts = [0usize; N_CLASSES];
        for tree in &self.trees {
            counts[usize::from(tree.predict(sample))] += 1;
        }
        let total = self.trees.len().max(1) as f64;
        let mut fractions = [0.0; N_CLASSES];
        for class in 0..N_CLASSES {
            fractions[class] = counts[class] as f64 / total;
        }
        fractions
    }

    /// Confidence of the predicted class: the largest vote fraction.
    #[must_use]
    pub fn confidence(&self, sample: &[f64; N_FEATURES]) -> f64 {
        let votes = self.vote_fractions(sample);
        votes.iter().copied().fold(0.0, f64::max)
    }

    /// The hyperparameters this forest was fitted with.
    #[must_use]
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn class_counts(labels: &[u8], indices: &[usize]) -> [usize; N_CLASSES] {
    let mut counts = [0usize; N_CLASSES];
    for &i in indices {
        counts[usize::from(labels[i])] += 1;
    }
    counts
}

fn majority_class(counts: &[usize; N_CLASSES]) -> u8 {
    let mut best = 0;
    for class in 1..N_CLASSES {
        if counts[class] > counts[best] {
            best = class;
        }
    }
    best as u8
}

fn is_pure(counts: &[usize; N_CLASSES]) -> bool {
    counts.iter().filter(|&&c| c > 0).count() <= 1
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    features: &[[f64; N_FEATURES]],
    labels: &[u8],
    indices: &[usize],
    depth: usize,
    config: &ForestConfig,
    rng: &mut StdRng,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    let node_idx = nodes.len();
    let counts = class_counts(labels, indices);
    let majority = majority_class(&counts);

    if depth >= config.max_depth || indices.len() < config.min_samples_split || is_pure(&counts) {
        nodes.push(leaf(majority));
        return node_idx;
    }

    let Some((best_feature, best_threshold)) =
        find_best_split(features, labels, indices, config, rng)
    else {
        nodes.push(leaf(majority));
        return node_idx;
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| features[i][best_feature] <= best_threshold);

    if left_indices.len() < config.min_samples_leaf || right_indices.len() < config.min_samples_leaf
    {
        nodes.push(leaf(majority));
        return node_idx;
    }

    nodes.push(TreeNode {
        feature_idx: Some(best_feature),
        threshold: best_threshold,
        left: None,
        right: None,
        prediction: majority,
    });

    let left_idx = build_node(features, labels, &left_indices, depth + 1, config, rng, nodes);
    let right_idx = build_node(
        features,
        labels,
        &right_indices,
        depth + 1,
        config,
        rng,
        nodes,
    );

    nodes[node_idx].left = Some(left_idx);
    nodes[node_idx].right = Some(right_idx);

    node_idx
}

fn leaf(prediction: u8) -> TreeNode {
    TreeNode {
        feature_idx: None,
        threshold: 0.0,
        left: None,
        right: None,
        prediction,
    }
}

/// Scan a random feature subset for the threshold with the lowest
/// weighted gini impurity. Returns `None` when no split separates the
/// samples while honoring `min_samples_leaf`.
fn find_best_split(
    features: &[[f64; N_FEATURES]],
    labels: &[u8],
    indices: &[usize],
    config: &ForestConfig,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    // sqrt(4) = 2 candidate features per split.
    let max_features = (N_FEATURES as f64).sqrt().round() as usize;
    let all_features: [usize; N_FEATURES] = [0, 1, 2, 3];
    let candidates: Vec<usize> = all_features
        .choose_multiple(rng, max_features.max(1))
        .copied()
        .collect();

    let mut best: Option<(usize, f64)> = None;
    let mut best_gini = f64::MAX;

    for &feature in &candidates {
        let mut values: Vec<f64> = indices.iter().map(|&i| features[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        for window in values.windows(2) {
            let threshold = (window[0] + window[1]) / 2.0;
            if let Some(gini) =
                split_gini(features, labels, indices, feature, threshold, config)
            {
                if gini < best_gini {
                    best_gini = gini;
                    best = Some((feature, threshold));
                }
            }
        }
    }

    best
}

/// Weighted gini impurity of a candidate split, or `None` when either
/// side would fall below `min_samples_leaf`.
fn split_gini(
    features: &[[f64; N_FEATURES]],
    labels: &[u8],
    indices: &[usize],
    feature: usize,
    threshold: f64,
    config: &ForestConfig,
) -> Option<f64> {
    let mut left = [0usize; N_CLASSES];
    let mut right = [0usize; N_CLASSES];

    for &i in indices {
        let side = if features[i][feature] <= threshold {
            &mut left
        } else {
            &mut right
        };
        side[usize::from(labels[i])] += 1;
    }

    let left_total: usize = left.iter().sum();
    let right_total: usize = right.iter().sum();
    if left_total < config.min_samples_leaf || right_total < config.min_samples_leaf {
        return None;
    }

    let total = (left_total + right_total) as f64;
    Some(
        (left_total as f64 * gini(&left, left_total)
            + right_total as f64 * gini(&right, right_total))
            / total,
    )
}

fn gini(counts: &[usize; N_CLASSES], total: usize) -> f64 {
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / total).powi(2))
        .sum::<f64>()
}
