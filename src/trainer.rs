//! The sequential training pipeline: load, split, fit, evaluate, persist.
//!
//! Control flow is strictly linear. Any step error aborts the whole run;
//! the only non-fatal condition is held-out accuracy falling below the
//! 0.95 threshold, which prints a warning and flows on.

use crate::artifact::{self, ModelMetadata, METADATA_FILE, MODEL_FILE};
use crate::dataset::{IrisDataset, FEATURE_NAMES, REFERENCE_SAMPLES, TARGET_NAMES};
use crate::error::Result;
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics::{
    accuracy_score, classification_report, confusion_matrix, format_confusion_matrix,
    format_report,
};
use crate::selection::{cross_val_accuracy, train_test_split};
use std::fs;
use std::path::{Path, PathBuf};

/// Held-out accuracy below this prints a warning (non-fatal).
pub const ACCURACY_THRESHOLD: f64 = 0.95;

/// Test share of the stratified split.
const TEST_RATIO: f64 = 0.2;

/// Folds for cross-validation.
const CV_FOLDS: usize = 5;

/// A fitted forest plus its evaluation figures.
#[derive(Debug)]
pub struct TrainedModel {
    pub forest: RandomForest,
    pub accuracy: f64,
    pub cv_accuracy: f64,
}

/// Split, fit and evaluate with the fixed hyperparameters.
///
/// Prints per-fold CV scores, the classification report and the confusion
/// matrix for the held-out set.
///
/// # Errors
///
/// Propagates fit errors (shape mismatches are fatal to the pipeline).
pub fn train_model(data: &IrisDataset) -> Result<TrainedModel> {
    println!("Training random forest classifier...");

    let config = ForestConfig::default();
    let split = train_test_split(&data.labels, TEST_RATIO, config.seed);

    let train_features: Vec<_> = split.train.iter().map(|&i| data.features[i]).collect();
    let train_labels: Vec<u8> = split.train.iter().map(|&i| data.labels[i]).collect();
    let test_features: Vec<_> = split.test.iter().map(|&i| data.features[i]).collect();
    let test_labels: Vec<u8> = split.test.iter().map(|&i| data.labels[i]).collect();

    let forest = RandomForest::fit(&train_features, &train_labels, config)?;

    let predictions = forest.predict_batch(&test_features);
    let accuracy = accuracy_score(&predictions, &test_labels);

    let cv_scores = cross_val_accuracy(&data.features, &data.labels, config, CV_FOLDS, config.seed)?;
    let cv_accuracy = cv_scores.iter().sum::<f64>() / cv_scores.len() as f64;

    println!("Test accuracy: {accuracy:.4}");
    println!("Cross-validation scores: {cv_scores:.4?}");
    println!("Mean CV accuracy: {cv_accuracy:.4}");

    println!("\nClassification report:");
    let reports = classification_report(&predictions, &test_labels);
    print!("{}", format_report(&reports, &TARGET_NAMES));

    println!("\nConfusion matrix:");
    print!(
        "{}",
        format_confusion_matrix(&confusion_matrix(&predictions, &test_labels))
    );

    Ok(TrainedModel {
        forest,
        accuracy,
        cv_accuracy,
    })
}

/// Persist the artifact and its descriptor into `output_dir`.
///
/// Creates the directory if absent; overwrites existing files silently.
/// Returns the two written paths.
///
/// # Errors
///
/// Returns an error if directory creation, serialization or a write
/// fails.
pub fn save_model(trained: &TrainedModel, output_dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
    println!("Saving model and metadata...");

    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let model_path = output_dir.join(MODEL_FILE);
    artifact::save_forest(&trained.forest, &model_path)?;
    println!("Model saved to: {}", model_path.display());

    let metadata = ModelMetadata::new(trained.accuracy, trained.cv_accuracy, trained.forest.config());
    let metadata_path = output_dir.join(METADATA_FILE);
    metadata.save(&metadata_path)?;
    println!("Metadata saved to: {}", metadata_path.display());

    Ok((model_path, metadata_path))
}

/// Reload the saved artifact and predict the three reference samples.
///
/// Prints predicted class and confidence per sample. A wrong prediction
/// is an `InvalidFormat` error: the artifact on disk does not behave like
/// the model that was just fitted.
///
/// # Errors
///
/// Returns an error on load failure or a reference-sample mismatch; both
/// are fatal to the pipeline.
pub fn verify_saved_model(model_path: impl AsRef<Path>) -> Result<()> {
    println!("Verifying saved model...");

    let forest = artifact::load_forest(model_path)?;

    for (name, sample, expected) in REFERENCE_SAMPLES {
        let predicted = forest.predict(&sample);
        let confidence = forest.confidence(&sample);
        println!("{name}: {sample:?} -> class {predicted} (confidence: {confidence:.3})");

        if predicted != expected {
            return Err(crate::error::PipelineError::invalid_format(format!(
                "reloaded model predicts {predicted} for {name}, expected {expected}"
            )));
        }
    }

    Ok(())
}

/// Run the full pipeline: load, train, save, verify.
///
/// # Errors
///
/// Returns the first step error; the caller maps it to the process exit
/// code.
pub fn run(output_dir: impl AsRef<Path>) -> Result<()> {
    println!("=== Iris Classifier Training Pipeline ===\n");

    println!("Loading Iris dataset...");
    let data = IrisDataset::load()?;
    println!("Dataset shape: {}x{}", data.len(), FEATURE_NAMES.len());
    println!("Features: {FEATURE_NAMES:?}");
    println!("Target classes: {TARGET_NAMES:?}\n");

    let trained = train_model(&data)?;

    if trained.accuracy < ACCURACY_THRESHOLD {
        println!(
            "\nWarning: accuracy {:.4} is below the {ACCURACY_THRESHOLD} threshold",
            trained.accuracy
        );
    } else {
        println!(
            "\nAccuracy {:.4} meets the {ACCURACY_THRESHOLD} requirement",
            trained.accuracy
        );
    }

    println!();
    let (model_path, metadata_path) = save_model(&trained, &output_dir)?;

    println!();
    verify_saved_model(&model_path)?;

    println!("\nTraining pipeline completed");
    println!("Model: {}", model_path.display());
    println!("Metadata: {}", metadata_path.display());
    println!("Final accuracy: {:.4}", trained.accuracy);

    Ok(())
}
