//! The bundled Iris dataset.
//!
//! The 150-sample Iris table ships inside the binary via `include_str!`,
//! so loading is deterministic and needs no network or filesystem access.
//! Each sample is a fixed-length vector of 4 measurements and a class
//! label in {0, 1, 2}.

use crate::error::{PipelineError, Result};

/// Number of features per sample.
pub const N_FEATURES: usize = 4;

/// Number of target classes.
pub const N_CLASSES: usize = 3;

/// Ordered feature names, matching the column order of the bundled data.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

/// Ordered class names: the label value is the index into this array.
pub const TARGET_NAMES: [&str; N_CLASSES] = ["setosa", "versicolor", "virginica"];

/// One well-separated reference sample per species, with its expected
/// class. Used by the trainer's post-save verification and as the probe's
/// test fixtures.
pub const REFERENCE_SAMPLES: [(&str, [f64; N_FEATURES], u8); N_CLASSES] = [
    ("setosa", [5.1, 3.5, 1.4, 0.2], 0),
    ("versicolor", [6.2, 2.9, 4.3, 1.3], 1),
    ("virginica", [7.3, 2.9, 6.3, 1.8], 2),
];

const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// The Iris dataset: feature matrix plus label vector.
///
/// Immutable once loaded; both pipelines only ever read it.
#[derive(Debug, Clone)]
pub struct IrisDataset {
    /// Feature rows, each exactly [`N_FEATURES`] measurements.
    pub features: Vec<[f64; N_FEATURES]>,
    /// Class labels, one per feature row, each in `0..N_CLASSES`.
    pub labels: Vec<u8>,
}

impl IrisDataset {
    /// Parse the bundled CSV into a dataset.
    ///
    /// # Errors
    ///
    /// Returns a `Dataset` error if any bundled row is malformed; this
    /// aborts the trainer because the data is a compile-time asset.
    pub fn load() -> Result<Self> {
        let mut features = Vec::with_capacity(150);
        let mut labels = Vec::with_capacity(150);

        for (idx, line) in IRIS_CSV.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != N_FEATURES + 1 {
                return Err(PipelineError::dataset(
                    idx + 1,
                    format!("expected {} fields, got {}", N_FEATURES + 1, fields.len()),
                ));
            }

            let mut row = [0.0f64; N_FEATURES];
            for (col, field) in fields[..N_FEATURES].iter().enumerate() {
                row[col] = field.parse::<f64>().map_err(|e| {
                    PipelineError::dataset(idx + 1, format!("column {col}: {e}"))
                })?;
            }

            let label: u8 = fields[N_FEATURES]
                .parse()
                .map_err(|e| PipelineError::dataset(idx + 1, format!("label: {e}")))?;
            if usize::from(label) >= N_CLASSES {
                return Err(PipelineError::dataset(
                    idx + 1,
                    format!("label {label} out of range"),
                ));
            }

            features.push(row);
            labels.push(label);
        }

        Ok(Self { features, labels })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Count of samples carrying the given label.
    #[must_use]
    pub fn class_count(&self, label: u8) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}
