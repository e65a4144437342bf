//! Error types for the prediction service.
//!
//! Startup errors (`LabelError`, `ModelError` at load time) abort the process.
//! Everything that can go wrong while serving a request is a `PredictError`,
//! whose display string becomes the `{"error": ...}` payload.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

/// Failures building or querying the label index.
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Dataset directory does not exist: {0}")]
    MissingDir(PathBuf),

    #[error("No class labels found in {0}")]
    Empty(PathBuf),

    #[error("Failed to read labels from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Class folder name is not valid UTF-8: {0:?}")]
    InvalidName(OsString),

    #[error("Duplicate class label: {0}")]
    Duplicate(String),

    #[error("Class index {index} out of range ({len} labels known)")]
    OutOfRange { index: usize, len: usize },
}

/// Failures loading or running the classifier.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Invalid input shape: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model produces {outputs} scores but {labels} labels are known")]
    ClassCount { outputs: usize, labels: usize },
}

/// Per-request failures, reported to the client as `{"error": <message>}`.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid image: {0}")]
    Decode(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("Model API returned {0}")]
    Upstream(u16),

    #[error("Model API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("No file field in upload")]
    MissingFile,

    #[error("Upload exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Prediction worker failed")]
    Worker,
}

impl From<actix_multipart::MultipartError> for PredictError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        PredictError::Upload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_embeds_status_code() {
        assert_eq!(
            PredictError::Upstream(503).to_string(),
            "Model API returned 503"
        );
    }

    #[test]
    fn label_errors_pass_through_unchanged() {
        let err: PredictError = LabelError::OutOfRange { index: 7, len: 3 }.into();
        assert_eq!(err.to_string(), "Class index 7 out of range (3 labels known)");
    }

    #[test]
    fn model_errors_are_prefixed() {
        let err: PredictError = ModelError::ClassCount {
            outputs: 4,
            labels: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Model error: Model produces 4 scores but 3 labels are known"
        );
    }
}
