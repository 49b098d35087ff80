//! Error types for the review-sentiment library.
//!
//! All failures are represented by the [`SentimentError`] enum. The variants
//! mirror how a failure is meant to be handled: input validation problems are
//! client errors surfaced at the inference boundary, everything else is an
//! internal failure.
//!
//! # Examples
//!
//! ```
//! use review_sentiment::error::{Result, SentimentError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SentimentError::input_validation("text must not be empty"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert!(err.is_client_error());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for review-sentiment operations.
#[derive(Error, Debug)]
pub enum SentimentError {
    /// I/O errors (artifact files, training data)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed caller input (missing or empty text).
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// A component was used before it was fitted.
    #[error("Component not fitted: {0}")]
    UnfittedComponent(String),

    /// A label that the encoder never saw during fit.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// A label index outside of the fitted label space.
    #[error("Label index {index} out of range for {len} classes")]
    OutOfRange { index: usize, len: usize },

    /// A required artifact file or bundle version does not exist.
    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    /// An artifact exists but cannot be decoded or disagrees with its siblings.
    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Nothing is left to train on after filtering.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SentimentError.
pub type Result<T> = std::result::Result<T, SentimentError>;

impl SentimentError {
    /// Create a new input validation error.
    pub fn input_validation<S: Into<String>>(msg: S) -> Self {
        SentimentError::InputValidation(msg.into())
    }

    /// Create a new unfitted component error.
    pub fn unfitted<S: Into<String>>(component: S) -> Self {
        SentimentError::UnfittedComponent(component.into())
    }

    /// Create a new unknown label error.
    pub fn unknown_label<S: Into<String>>(label: S) -> Self {
        SentimentError::UnknownLabel(label.into())
    }

    /// Create a new out of range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        SentimentError::OutOfRange { index, len }
    }

    /// Create a new artifact missing error.
    pub fn artifact_missing<S: Into<String>>(msg: S) -> Self {
        SentimentError::ArtifactMissing(msg.into())
    }

    /// Create a new artifact corrupt error.
    pub fn artifact_corrupt<S: Into<String>>(msg: S) -> Self {
        SentimentError::ArtifactCorrupt(msg.into())
    }

    /// Create a new empty dataset error.
    pub fn empty_dataset<S: Into<String>>(msg: S) -> Self {
        SentimentError::EmptyDataset(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SentimentError::InvalidConfig(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SentimentError::Serialization(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SentimentError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SentimentError::Other(msg.into())
    }

    /// Whether this error was caused by the caller's input rather than by
    /// the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SentimentError::InputValidation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SentimentError::input_validation("missing text");
        assert_eq!(error.to_string(), "Invalid input: missing text");

        let error = SentimentError::unknown_label("Mixed");
        assert_eq!(error.to_string(), "Unknown label: Mixed");

        let error = SentimentError::out_of_range(7, 3);
        assert_eq!(error.to_string(), "Label index 7 out of range for 3 classes");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(SentimentError::input_validation("empty").is_client_error());
        assert!(!SentimentError::artifact_missing("CURRENT").is_client_error());
        assert!(!SentimentError::unfitted("vectorizer").is_client_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SentimentError::from(io_error);

        match error {
            SentimentError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
