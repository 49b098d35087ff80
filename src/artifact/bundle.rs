//! The artifact bundle and its manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SentimentError};
use crate::ml::label_encoder::LabelEncoder;
use crate::ml::logistic::{FitSummary, LogisticRegression};
use crate::ml::metrics::ClassificationReport;
use crate::ml::vectorizer::TfIdfVectorizer;
use crate::training::config::TrainingConfig;

/// On-disk layout version written into every manifest.
pub const FORMAT_VERSION: u32 = 1;

/// The fitted components needed to turn text into a sentiment label.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactBundle {
    pub vectorizer: TfIdfVectorizer,
    pub classifier: LogisticRegression,
    pub label_encoder: LabelEncoder,
}

impl ArtifactBundle {
    /// Assemble a bundle, rejecting mismatched components.
    pub fn new(
        vectorizer: TfIdfVectorizer,
        classifier: LogisticRegression,
        label_encoder: LabelEncoder,
    ) -> Result<Self> {
        let bundle = ArtifactBundle {
            vectorizer,
            classifier,
            label_encoder,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Check that the three components are fitted and agree on dimensions.
    pub fn validate(&self) -> Result<()> {
        if !self.vectorizer.is_fitted() {
            return Err(SentimentError::unfitted("TfIdfVectorizer"));
        }
        if !self.classifier.is_fitted() {
            return Err(SentimentError::unfitted("LogisticRegression"));
        }
        if self.label_encoder.is_empty() {
            return Err(SentimentError::unfitted("LabelEncoder"));
        }
        self.classifier.validate_shape()?;

        if self.vectorizer.num_features() != self.classifier.n_features() {
            return Err(SentimentError::artifact_corrupt(format!(
                "vectorizer produces {} features but classifier expects {}",
                self.vectorizer.num_features(),
                self.classifier.n_features()
            )));
        }
        if self.label_encoder.len() != self.classifier.n_classes() {
            return Err(SentimentError::artifact_corrupt(format!(
                "label encoder has {} classes but classifier has {}",
                self.label_encoder.len(),
                self.classifier.n_classes()
            )));
        }
        Ok(())
    }
}

/// Metadata stored next to a bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    /// Name of the version directory.
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub n_features: usize,
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<TrainingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<ClassificationReport>,
}

impl Manifest {
    /// A manifest for `bundle` with a fresh, time-ordered version id.
    pub fn for_bundle(bundle: &ArtifactBundle) -> Self {
        let created_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let version = format!("{}-{}", created_at.format("%Y%m%dT%H%M%S%.3fZ"), &suffix[..8]);

        Manifest {
            format_version: FORMAT_VERSION,
            version,
            created_at,
            n_features: bundle.vectorizer.num_features(),
            classes: bundle.label_encoder.classes().to_vec(),
            training: None,
            fit: None,
            evaluation: None,
        }
    }

    pub fn with_training(mut self, config: TrainingConfig) -> Self {
        self.training = Some(config);
        self
    }

    pub fn with_fit(mut self, summary: FitSummary) -> Self {
        self.fit = Some(summary);
        self
    }

    pub fn with_evaluation(mut self, report: ClassificationReport) -> Self {
        self.evaluation = Some(report);
        self
    }

    /// Check that this manifest describes `bundle`.
    pub fn check_matches(&self, bundle: &ArtifactBundle) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(SentimentError::artifact_corrupt(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.n_features != bundle.vectorizer.num_features() {
            return Err(SentimentError::artifact_corrupt(format!(
                "manifest lists {} features but vectorizer has {}",
                self.n_features,
                bundle.vectorizer.num_features()
            )));
        }
        if self.classes != bundle.label_encoder.classes() {
            return Err(SentimentError::artifact_corrupt(
                "manifest classes disagree with label encoder",
            ));
        }
        Ok(())
    }
}
