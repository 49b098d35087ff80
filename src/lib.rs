//! # review-sentiment
//!
//! Bag-of-words sentiment classification for product reviews.
//!
//! ## Features
//!
//! - Deterministic review normalization (stop words, Porter stemming)
//! - TF-IDF features over unigrams and bigrams
//! - Class-balanced multinomial logistic regression
//! - Stratified, seeded train/validation split with evaluation report
//! - Versioned, atomically written artifact bundles
//! - Thread-safe inference over a loaded bundle
//!
//! ## Example
//!
//! ```no_run
//! use review_sentiment::prelude::*;
//!
//! let mut orchestrator = TrainingOrchestrator::new(TrainingConfig::default()).unwrap();
//! let report = orchestrator.run().unwrap();
//! println!("saved {:?}", report.version);
//!
//! let service = InferenceService::load(&ArtifactStore::new("models")).unwrap();
//! let sentiment = service.predict("Great taste, will buy again").unwrap();
//! println!("{sentiment}");
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod error;
pub mod inference;
pub mod ml;
pub mod sentiment;
pub mod training;

pub mod prelude {
    pub use crate::analysis::TextNormalizer;
    pub use crate::artifact::{ArtifactBundle, ArtifactStore, Manifest};
    pub use crate::error::{Result, SentimentError};
    pub use crate::inference::{InferenceService, PredictRequest, PredictResponse};
    pub use crate::ml::{LabelEncoder, LogisticRegression, TfIdfVectorizer};
    pub use crate::sentiment::Sentiment;
    pub use crate::training::{TrainingConfig, TrainingOrchestrator, TrainingReport};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
