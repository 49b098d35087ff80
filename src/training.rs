//! Offline training pipeline.
//!
//! [`TrainingOrchestrator`] takes raw review records through cleaning, label
//! derivation, a stratified split and model fitting, then persists the fitted
//! components as one versioned artifact bundle.

pub mod config;
pub mod dataset;
pub mod orchestrator;

pub use config::{DatasetColumns, TrainingConfig};
pub use dataset::{CleanStats, LabelledReview, RawReview, Review};
pub use orchestrator::{TrainingOrchestrator, TrainingReport, TrainingStage};
