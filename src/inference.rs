//! Online prediction.
//!
//! [`InferenceService`] loads one artifact bundle up front and then answers
//! any number of concurrent prediction calls. Nothing is mutated after
//! construction, so the service is shared behind an `Arc` without locking.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use review_sentiment::artifact::ArtifactStore;
//! use review_sentiment::inference::{InferenceService, PredictRequest};
//!
//! let service = Arc::new(InferenceService::load(&ArtifactStore::new("models")).unwrap());
//! let response = service
//!     .handle(PredictRequest::new("Great taste, will buy again"))
//!     .unwrap();
//! println!("{} -> {}", response.input_text, response.predicted_sentiment);
//! ```

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::TextNormalizer;
use crate::artifact::{ArtifactBundle, ArtifactStore};
use crate::error::{Result, SentimentError};
use crate::sentiment::Sentiment;

/// A prediction call as received at the service boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl PredictRequest {
    pub fn new<S: Into<String>>(text: S) -> Self {
        PredictRequest {
            text: Some(text.into()),
        }
    }
}

/// The answer to a [`PredictRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub input_text: String,
    pub predicted_sentiment: Sentiment,
}

/// Class probabilities for one text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub predicted_sentiment: Sentiment,
    /// `(sentiment, probability)` in label index order.
    pub probabilities: Vec<(Sentiment, f64)>,
}

/// Read-only prediction over a loaded bundle.
#[derive(Debug)]
pub struct InferenceService {
    normalizer: TextNormalizer,
    bundle: ArtifactBundle,
    /// Sentiment of each label index, resolved once at load.
    sentiments: Vec<Sentiment>,
    version: Option<String>,
}

impl InferenceService {
    /// Load the current bundle from `store`.
    ///
    /// Fails if the bundle is missing or inconsistent; a service is never
    /// built around a partial bundle.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let version = store.current_version()?;
        let bundle = store.load_version(&version)?;
        let mut service = Self::from_bundle(bundle)?;
        service.version = Some(version);
        Ok(service)
    }

    /// Serve predictions from an in-memory bundle.
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        bundle.validate()?;
        let sentiments = bundle
            .label_encoder
            .classes()
            .iter()
            .map(|label| label.parse::<Sentiment>())
            .collect::<Result<Vec<_>>>()
            .map_err(|e| SentimentError::artifact_corrupt(e.to_string()))?;

        info!(
            "Inference service ready: {} features, classes {:?}",
            bundle.vectorizer.num_features(),
            sentiments
        );

        Ok(InferenceService {
            normalizer: TextNormalizer::new()?,
            bundle,
            sentiments,
            version: None,
        })
    }

    /// Version id of the loaded bundle, when loaded from a store.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Predict the sentiment of `text`.
    ///
    /// Empty text is accepted: it normalizes to nothing, maps to the zero
    /// feature vector and gets the classifier's default class.
    pub fn predict(&self, text: &str) -> Result<Sentiment> {
        let normalized = self.normalizer.normalize(text);
        let features = self.bundle.vectorizer.transform_one(&normalized)?;
        let index = self.bundle.classifier.predict_one(&features)?;
        debug!("Predicted class {index} for {:?}", normalized);
        self.sentiment(index)
    }

    /// Predict many texts in parallel, preserving input order.
    pub fn predict_batch<S>(&self, texts: &[S]) -> Result<Vec<Sentiment>>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|text| self.predict(text.as_ref())).collect()
    }

    /// Class probabilities for `text`.
    pub fn predict_proba(&self, text: &str) -> Result<SentimentScores> {
        let normalized = self.normalizer.normalize(text);
        let features = self.bundle.vectorizer.transform_one(&normalized)?;
        let proba = self.bundle.classifier.predict_proba(&features)?;

        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }

        Ok(SentimentScores {
            predicted_sentiment: self.sentiment(best)?,
            probabilities: self.sentiments.iter().copied().zip(proba).collect(),
        })
    }

    /// Answer a boundary request. Missing or blank text is a client error.
    pub fn handle(&self, request: PredictRequest) -> Result<PredictResponse> {
        let text = match request.text {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => return Err(SentimentError::input_validation("text must not be empty")),
            None => return Err(SentimentError::input_validation("missing field 'text'")),
        };

        let predicted_sentiment = self.predict(&text)?;
        Ok(PredictResponse {
            input_text: text,
            predicted_sentiment,
        })
    }

    fn sentiment(&self, index: usize) -> Result<Sentiment> {
        self.sentiments
            .get(index)
            .copied()
            .ok_or_else(|| SentimentError::out_of_range(index, self.sentiments.len()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::ml::VectorizerConfig;
    use crate::training::{RawReview, TrainingConfig, TrainingOrchestrator};

    fn service() -> InferenceService {
        let config = TrainingConfig {
            vectorizer: VectorizerConfig {
                min_df: 1,
                ..VectorizerConfig::default()
            },
            test_size: 0.0,
            ..TrainingConfig::default()
        };
        let raw = vec![
            RawReview::new(5.0, "Great taste, love it"),
            RawReview::new(5.0, "Wonderful, works great"),
            RawReview::new(1.0, "Terrible, broke fast"),
            RawReview::new(1.0, "Awful waste of money"),
            RawReview::new(3.0, "Okay, nothing special"),
        ];
        let mut orchestrator = TrainingOrchestrator::new(config).unwrap();
        let (bundle, _) = orchestrator.fit(raw).unwrap();
        InferenceService::from_bundle(bundle).unwrap()
    }

    #[test]
    fn test_predict() {
        let service = service();
        assert_eq!(service.predict("great taste").unwrap(), Sentiment::Positive);
        assert_eq!(service.predict("terrible waste").unwrap(), Sentiment::Negative);
    }

    #[test]
    fn test_empty_text_still_predicts() {
        let service = service();
        let sentiment = service.predict("").unwrap();
        assert!(Sentiment::ALL.contains(&sentiment));
        assert_eq!(service.predict("the and of").unwrap(), sentiment);
    }

    #[test]
    fn test_handle_rejects_missing_or_blank_text() {
        let service = service();

        let err = service.handle(PredictRequest::default()).unwrap_err();
        assert!(err.is_client_error());
        let err = service.handle(PredictRequest::new("   ")).unwrap_err();
        assert!(err.is_client_error());

        let response = service.handle(PredictRequest::new("love it")).unwrap();
        assert_eq!(response.input_text, "love it");
        assert_eq!(response.predicted_sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_batch_matches_single() {
        let service = service();
        let texts = ["great taste", "awful money", "", "okay"];
        let batch = service.predict_batch(&texts).unwrap();
        let single: Vec<Sentiment> = texts.iter().map(|t| service.predict(t).unwrap()).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_probabilities() {
        let service = service();
        let scores = service.predict_proba("wonderful").unwrap();
        assert_eq!(scores.probabilities.len(), 3);
        let total: f64 = scores.probabilities.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(scores.predicted_sentiment, service.predict("wonderful").unwrap());
    }

    #[test]
    fn test_concurrent_calls() {
        let service = Arc::new(service());
        let expected = service.predict("great taste").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.predict("great taste").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_request_json() {
        let request: PredictRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.text, None);

        let response = PredictResponse {
            input_text: "ok".into(),
            predicted_sentiment: Sentiment::Neutral,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"input_text":"ok","predicted_sentiment":"Neutral"}"#
        );
    }
}
