//! Model artifact persistence.
//!
//! A fitted forest is written as a small container file: a fixed header
//! with magic bytes, format version and payload length, followed by the
//! JSON-encoded forest. The sibling `metadata.json` descriptor carries the
//! deployment-facing schema: name, version, metrics, feature names,
//! hyperparameters and example I/O. Both files are written once and never
//! mutated; existing files at the same paths are overwritten silently.

use crate::dataset::{FEATURE_NAMES, TARGET_NAMES};
use crate::error::{PipelineError, Result};
use crate::forest::{ForestConfig, RandomForest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::Path;

/// Artifact container magic bytes.
const MAGIC: &[u8; 4] = b"IRFS";

/// Container format version (major, minor).
const FORMAT_VERSION: (u8, u8) = (1, 0);

/// Header: magic + version + 2 reserved + payload length (u64 LE).
const HEADER_SIZE: usize = 16;

/// Default artifact file name.
pub const MODEL_FILE: &str = "model.bin";

/// Default descriptor file name.
pub const METADATA_FILE: &str = "metadata.json";

/// Serialize a fitted forest into the container file at `path`.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn save_forest(forest: &RandomForest, path: impl AsRef<Path>) -> Result<()> {
    let payload =
        serde_json::to_vec(forest).map_err(|e| PipelineError::Serialization(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION.0);
    bytes.push(FORMAT_VERSION.1);
    bytes.extend_from_slice(&[0u8; 2]);
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&payload);

    fs::write(path, bytes)?;
    Ok(())
}

/// Load a fitted forest back from a container file.
///
/// # Errors
///
/// Returns `ModelNotFound` for a missing file and `InvalidFormat` when the
/// header or payload is malformed.
pub fn load_forest(path: impl AsRef<Path>) -> Result<RandomForest> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)?;
    if bytes.len() < HEADER_SIZE {
        return Err(PipelineError::invalid_format(format!(
            "file too short: {} bytes, minimum {HEADER_SIZE} required",
            bytes.len()
        )));
    }
    if &bytes[0..4] != MAGIC {
        return Err(PipelineError::invalid_format(format!(
            "invalid magic bytes: expected IRFS, got {:?}",
            &bytes[0..4]
        )));
    }
    if bytes[4] != FORMAT_VERSION.0 {
        return Err(PipelineError::invalid_format(format!(
            "unsupported format version {}.{}",
            bytes[4], bytes[5]
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[8..16]);
    let payload_len = u64::from_le_bytes(len_bytes) as usize;
    if bytes.len() != HEADER_SIZE + payload_len {
        return Err(PipelineError::invalid_format(format!(
            "payload length mismatch: header says {payload_len}, file has {}",
            bytes.len() - HEADER_SIZE
        )));
    }

    serde_json::from_slice(&bytes[HEADER_SIZE..])
        .map_err(|e| PipelineError::Serialization(e.to_string()))
}

/// Deployment descriptor written alongside the model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    pub model_version: String,
    pub framework: String,
    pub algorithm: String,
    pub created_at: String,
    pub accuracy: f64,
    pub cv_accuracy: f64,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub model_parameters: serde_json::Value,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
    pub example_input: serde_json::Value,
    pub example_output: serde_json::Value,
    pub description: String,
}

impl ModelMetadata {
    /// Build the descriptor for a freshly trained forest.
    #[must_use]
    pub fn new(accuracy: f64, cv_accuracy: f64, config: &ForestConfig) -> Self {
        Self {
            model_name: "iris-classifier".to_string(),
            model_version: "v1".to_string(),
            framework: "iris-pipeline".to_string(),
            algorithm: "RandomForest".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            accuracy,
            cv_accuracy,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            target_names: TARGET_NAMES.iter().map(ToString::to_string).collect(),
            model_parameters: json!({
                "n_estimators": config.n_trees,
                "random_state": config.seed,
                "max_depth": config.max_depth,
                "min_samples_split": config.min_samples_split,
                "min_samples_leaf": config.min_samples_leaf,
            }),
            input_schema: json!({
                "type": "array",
                "items": {
                    "type": "array",
                    "items": {"type": "number"},
                    "minItems": 4,
                    "maxItems": 4,
                },
            }),
            output_schema: json!({
                "type": "object",
                "properties": {
                    "predictions": {
                        "type": "array",
                        "items": {"type": "integer"},
                    },
                },
            }),
            example_input: json!([[5.1, 3.5, 1.4, 0.2]]),
            example_output: json!({"predictions": [0]}),
            description: "Iris flower species classifier trained on the classic Iris \
                          dataset. Predicts species (setosa=0, versicolor=1, virginica=2) \
                          based on sepal and petal measurements."
                .to_string(),
        }
    }

    /// Write the descriptor as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a descriptor back from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| PipelineError::Serialization(e.to_string()))
    }
}
