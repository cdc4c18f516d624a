//! Error types for the training and probing pipelines.
//!
//! Every failure is surfaced synchronously to its caller; nothing in this
//! crate retries. The variants mirror the failure taxonomy of the two
//! pipelines: data and fit errors abort the trainer, while the probe turns
//! transport, protocol and semantic failures into result records at the
//! call boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur during training or endpoint probing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Model artifact not found at the specified path.
    #[error("model not found: {path}")]
    ModelNotFound { path: PathBuf },

    /// Invalid artifact container or corrupted payload.
    #[error("invalid model format: {reason}")]
    InvalidFormat { reason: String },

    /// A bundled dataset row could not be parsed.
    #[error("malformed dataset row {line}: {reason}")]
    Dataset { line: usize, reason: String },

    /// Feature matrix and label vector shapes disagree.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// I/O error during file operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level failure: connection refused, timeout, DNS.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-200 status.
    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// A 200 response carried no predictions.
    #[error("no predictions in response")]
    EmptyPredictions,
}

impl PipelineError {
    /// Create a new invalid format error.
    #[must_use]
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Create a new dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new dataset parse error.
    #[must_use]
    pub fn dataset(line: usize, reason: impl Into<String>) -> Self {
        Self::Dataset {
            line,
            reason: reason.into(),
        }
    }

    /// True for transport, protocol and semantic endpoint failures.
    ///
    /// The probe converts these into failure records instead of
    /// propagating them; trainer-side errors stay fatal.
    #[must_use]
    pub fn is_endpoint_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Protocol { .. } | Self::EmptyPredictions
        )
    }
}
