//! # iris-pipeline
//!
//! Training and endpoint probing for a small Iris species classifier.
//!
//! Two independent, strictly sequential pipelines share this library:
//!
//! - **Trainer** (`iris-train`): load the bundled dataset, fit a seeded
//!   random forest, evaluate it, persist the artifact plus a metadata
//!   descriptor, then verify the saved model against reference samples.
//! - **Probe** (`iris-probe`): exercise a deployed inference endpoint
//!   with a health check, correctness checks per species, one batch
//!   prediction and a latency-sampling performance run.
//!
//! The serving side is an external platform treated as a black-box HTTP
//! collaborator; this crate never routes requests or hosts a model.

pub mod artifact;
pub mod client;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod harness;
pub mod metrics;
pub mod selection;
pub mod trainer;

pub use error::{PipelineError, Result};

/// Re-exports for convenient access
pub mod prelude {
    pub use crate::artifact::{load_forest, save_forest, ModelMetadata};
    pub use crate::client::{EndpointClient, PerfSummary, PredictionOutcome};
    pub use crate::dataset::IrisDataset;
    pub use crate::error::{PipelineError, Result};
    pub use crate::forest::{ForestConfig, RandomForest};
}
