//! Statistical text classification.
//!
//! This module holds the fitted components of the sentiment model and the
//! helpers used to train and evaluate them:
//!
//! - [`TfIdfVectorizer`] turns normalized text into sparse TF-IDF vectors
//! - [`LabelEncoder`] maps label strings to dense class indices
//! - [`LogisticRegression`] is the multinomial linear classifier
//! - [`StratifiedSplit`] partitions labelled data into train/validation sets
//! - [`ClassificationReport`] summarizes predictions against known labels

pub mod label_encoder;
pub mod logistic;
pub mod metrics;
pub mod sparse;
pub mod split;
pub mod vectorizer;

pub use label_encoder::LabelEncoder;
pub use logistic::{ClassWeight, FitSummary, LogisticRegression, LogisticRegressionConfig};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use sparse::SparseVector;
pub use split::StratifiedSplit;
pub use vectorizer::{TfIdfVectorizer, VectorizerConfig, Vocabulary};
