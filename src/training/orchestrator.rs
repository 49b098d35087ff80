//! End-to-end training run.
//!
//! A run moves through fixed stages:
//!
//! ```text
//! Loaded -> Cleaned -> LabelDerived -> Split -> Fitted -> Persisted
//! ```
//!
//! Only the final stage writes anything, and it does so through a single
//! atomic [`ArtifactStore::save_with_manifest`], so a run that fails earlier
//! leaves no bundle behind.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::TextNormalizer;
use crate::artifact::{ArtifactBundle, ArtifactStore, Manifest};
use crate::error::{Result, SentimentError};
use crate::ml::{
    ClassificationReport, FitSummary, LabelEncoder, LogisticRegression, StratifiedSplit,
    TfIdfVectorizer,
};
use crate::sentiment::Sentiment;
use crate::training::config::TrainingConfig;
use crate::training::dataset::{self, RawReview};

/// Stages of a training run, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainingStage {
    Loaded,
    Cleaned,
    LabelDerived,
    Split,
    Fitted,
    Persisted,
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a training run did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_loaded: usize,
    pub n_missing: usize,
    pub n_duplicates: usize,
    /// Documents per sentiment before the split.
    pub label_distribution: BTreeMap<Sentiment, usize>,
    pub n_train: usize,
    pub n_validation: usize,
    pub n_features: usize,
    pub fit: FitSummary,
    /// Scores on the validation subset, absent when nothing was held out.
    pub evaluation: Option<ClassificationReport>,
    /// Version id of the saved bundle, absent until persisted.
    pub version: Option<String>,
    pub bundle_dir: Option<PathBuf>,
}

/// Drives a training run from raw records to a persisted bundle.
#[derive(Debug)]
pub struct TrainingOrchestrator {
    config: TrainingConfig,
    normalizer: TextNormalizer,
    stage: Option<TrainingStage>,
}

impl TrainingOrchestrator {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(TrainingOrchestrator {
            config,
            normalizer: TextNormalizer::new()?,
            stage: None,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// The last stage reached, `None` before a run starts.
    pub fn stage(&self) -> Option<TrainingStage> {
        self.stage
    }

    /// Read the configured CSV and train into the configured output
    /// directory.
    pub fn run(&mut self) -> Result<TrainingReport> {
        let raw = dataset::read_csv(&self.config.data_path, &self.config.columns)?;
        let store = ArtifactStore::new(self.config.output_dir.clone());
        self.run_with_records(raw, &store)
    }

    /// Train on in-memory records and persist into `store`.
    pub fn run_with_records(
        &mut self,
        raw: Vec<RawReview>,
        store: &ArtifactStore,
    ) -> Result<TrainingReport> {
        let (bundle, mut report) = self.fit(raw)?;

        let mut manifest = Manifest::for_bundle(&bundle)
            .with_training(self.config.clone())
            .with_fit(report.fit.clone());
        if let Some(evaluation) = &report.evaluation {
            manifest = manifest.with_evaluation(evaluation.clone());
        }

        let manifest = store.save_with_manifest(&bundle, manifest)?;
        self.advance(TrainingStage::Persisted);

        report.bundle_dir = Some(store.version_dir(&manifest.version));
        report.version = Some(manifest.version);
        Ok(report)
    }

    /// Run every stage up to `Fitted` and return the bundle without saving.
    pub fn fit(&mut self, raw: Vec<RawReview>) -> Result<(ArtifactBundle, TrainingReport)> {
        self.stage = None;
        let n_loaded = raw.len();
        self.advance(TrainingStage::Loaded);

        let (reviews, stats) = dataset::clean(raw);
        self.advance(TrainingStage::Cleaned);
        info!(
            "Kept {} of {} records ({} incomplete, {} duplicates)",
            reviews.len(),
            n_loaded,
            stats.missing,
            stats.duplicates
        );
        if reviews.is_empty() {
            return Err(SentimentError::empty_dataset(
                "no usable records after cleaning",
            ));
        }

        let labelled = dataset::derive_labels(&reviews);
        let label_distribution = dataset::label_distribution(&labelled);
        self.advance(TrainingStage::LabelDerived);
        info!("Label distribution: {label_distribution:?}");

        let texts: Vec<&str> = labelled.iter().map(|r| r.text.as_str()).collect();
        let documents = self.normalizer.normalize_all(&texts);
        let label_names: Vec<&str> = labelled.iter().map(|r| r.sentiment.as_str()).collect();

        let mut label_encoder = LabelEncoder::new();
        label_encoder.fit(&label_names)?;
        let labels = label_encoder.encode_all(&label_names)?;

        let (train_idx, validation_idx) =
            StratifiedSplit::new(self.config.test_size, self.config.seed)?.split(&labels);
        self.advance(TrainingStage::Split);
        info!(
            "Split {} documents into {} train / {} validation",
            labels.len(),
            train_idx.len(),
            validation_idx.len()
        );

        let select_docs = |idx: &[usize]| idx.iter().map(|&i| documents[i].as_str()).collect::<Vec<_>>();
        let select_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();
        let (train_docs, train_labels) = (select_docs(&train_idx), select_labels(&train_idx));
        let (validation_docs, validation_labels) =
            (select_docs(&validation_idx), select_labels(&validation_idx));

        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone())?;
        let train_features = vectorizer.fit_transform(&train_docs)?;

        let mut classifier = LogisticRegression::new(self.config.classifier.clone())?;
        let fit = classifier.fit(&train_features, &train_labels)?;

        let evaluation = if validation_docs.is_empty() {
            None
        } else {
            let validation_features = vectorizer.transform(&validation_docs)?;
            let predicted = classifier.predict(&validation_features)?;
            let report =
                ClassificationReport::new(&validation_labels, &predicted, label_encoder.classes())?;
            info!(
                "Validation accuracy {:.4}, macro F1 {:.4}",
                report.accuracy, report.macro_f1
            );
            debug!("Validation report:\n{report}");
            Some(report)
        };

        let n_features = vectorizer.num_features();
        let bundle = ArtifactBundle::new(vectorizer, classifier, label_encoder)?;
        self.advance(TrainingStage::Fitted);

        let report = TrainingReport {
            n_loaded,
            n_missing: stats.missing,
            n_duplicates: stats.duplicates,
            label_distribution,
            n_train: train_idx.len(),
            n_validation: validation_idx.len(),
            n_features,
            fit,
            evaluation,
            version: None,
            bundle_dir: None,
        };
        Ok((bundle, report))
    }

    fn advance(&mut self, next: TrainingStage) {
        debug!(
            "Training stage {} -> {next}",
            self.stage.map_or_else(|| "Start".to_string(), |s| s.to_string())
        );
        self.stage = Some(next);
    }
}
