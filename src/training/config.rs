//! Training configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::ml::logistic::LogisticRegressionConfig;
use crate::ml::vectorizer::VectorizerConfig;

/// Column names of the review CSV.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetColumns {
    /// Numeric star rating.
    pub rating: String,
    /// Full review body.
    pub text: String,
    /// Optional short summary, prepended to the body when present.
    pub summary: Option<String>,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        DatasetColumns {
            rating: "Score".to_string(),
            text: "Text".to_string(),
            summary: Some("Summary".to_string()),
        }
    }
}

/// Everything a training run needs.
///
/// Can be read from a JSON file; missing fields take their defaults.
///
/// ```
/// use review_sentiment::training::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.vectorizer.max_features, 20000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// CSV file with labelled reviews.
    pub data_path: PathBuf,

    /// Base directory of the artifact store.
    pub output_dir: PathBuf,

    pub vectorizer: VectorizerConfig,

    pub classifier: LogisticRegressionConfig,

    /// Fraction of each class held out for validation.
    pub test_size: f64,

    /// Seed for the split shuffle.
    pub seed: u64,

    pub columns: DatasetColumns,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            data_path: PathBuf::from("data/raw/Reviews.csv"),
            output_dir: PathBuf::from("models"),
            vectorizer: VectorizerConfig::default(),
            classifier: LogisticRegressionConfig::default(),
            test_size: 0.2,
            seed: 42,
            columns: DatasetColumns::default(),
        }
    }
}

impl TrainingConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SentimentError::invalid_config(format!(
                "cannot read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make training meaningless.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate()?;

        if !(0.0..1.0).contains(&self.test_size) {
            return Err(SentimentError::invalid_config(format!(
                "test_size must be in [0, 1), got {}",
                self.test_size
            )));
        }
        if self.columns.rating.is_empty() || self.columns.text.is_empty() {
            return Err(SentimentError::invalid_config(
                "rating and text column names must not be empty",
            ));
        }
        Ok(())
    }
}
