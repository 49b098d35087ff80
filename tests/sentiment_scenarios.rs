use std::path::Path;

use review_sentiment::artifact::ArtifactStore;
use review_sentiment::error::{Result, SentimentError};
use review_sentiment::inference::{InferenceService, PredictRequest};
use review_sentiment::ml::VectorizerConfig;
use review_sentiment::sentiment::Sentiment;
use review_sentiment::training::dataset::{self, RawReview};
use review_sentiment::training::{TrainingConfig, TrainingOrchestrator, TrainingStage};
use tempfile::TempDir;

/// Distinct reviews built by pairing two phrase lists per rating.
fn review_rows() -> Vec<(f64, String)> {
    let groups: [(f64, &[&str], &[&str]); 3] = [
        (
            5.0,
            &[
                "Wonderful product",
                "Great taste",
                "Absolutely love it",
                "Works great",
                "Excellent quality",
            ],
            &[
                "would buy again",
                "highly recommend",
                "my kids love it",
                "great value",
                "works perfectly",
            ],
        ),
        (
            1.0,
            &[
                "Terrible product",
                "Broke after a day",
                "Complete waste of money",
                "Awful taste",
                "Stopped working",
            ],
            &[
                "want a refund",
                "do not buy",
                "waste of money",
                "very disappointed",
                "broke quickly",
            ],
        ),
        (
            3.0,
            &[
                "Okay product",
                "Average taste",
                "It is fine",
                "Nothing special",
                "Decent enough",
            ],
            &[
                "might buy again",
                "so so",
                "mixed feelings",
                "average value",
                "meh overall",
            ],
        ),
    ];

    let mut rows = Vec::new();
    for (rating, openings, endings) in groups {
        for opening in openings {
            for ending in endings {
                rows.push((rating, format!("{opening}, {ending}")));
            }
        }
    }
    rows
}

fn write_csv(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Id", "Score", "Summary", "Text"])?;
    for (i, (rating, text)) in review_rows().into_iter().enumerate() {
        writer.write_record([(i + 1).to_string(), rating.to_string(), String::new(), text])?;
    }
    // A row without rating and a repeat of the first review under a new summary.
    writer.write_record(["999", "", "No score", "dropped"])?;
    writer.write_record(["1000", "5", "Again", "Wonderful product, would buy again"])?;
    writer.flush()?;
    Ok(())
}

fn small_config(dir: &Path) -> TrainingConfig {
    TrainingConfig {
        data_path: dir.join("reviews.csv"),
        output_dir: dir.join("models"),
        vectorizer: VectorizerConfig {
            min_df: 1,
            ..VectorizerConfig::default()
        },
        ..TrainingConfig::default()
    }
}

fn trained_service(dir: &Path) -> Result<InferenceService> {
    let config = small_config(dir);
    write_csv(&config.data_path)?;

    let mut orchestrator = TrainingOrchestrator::new(config.clone())?;
    orchestrator.run()?;
    InferenceService::load(&ArtifactStore::new(config.output_dir))
}

#[test]
fn test_end_to_end_positive_and_negative() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = trained_service(temp_dir.path())?;

    assert_eq!(
        service.predict("This product is absolutely wonderful and works great")?,
        Sentiment::Positive
    );
    assert_eq!(
        service.predict("Terrible, broke after one day, complete waste of money")?,
        Sentiment::Negative
    );
    Ok(())
}

#[test]
fn test_empty_text_returns_valid_label() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = trained_service(temp_dir.path())?;

    assert!(service.normalizer().normalize("").is_empty());
    let sentiment = service.predict("")?;
    assert!(Sentiment::ALL.contains(&sentiment));

    // The boundary contract still rejects it as a client error.
    let err = service.handle(PredictRequest::new("")).unwrap_err();
    assert!(matches!(err, SentimentError::InputValidation(_)));
    Ok(())
}

#[test]
fn test_identical_text_identical_prediction() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = trained_service(temp_dir.path())?;

    let text = "Average taste, might buy again";
    let first = service.predict(text)?;
    for _ in 0..10 {
        assert_eq!(service.predict(text)?, first);
    }
    assert_eq!(service.handle(PredictRequest::new(text))?.predicted_sentiment, first);
    Ok(())
}

#[test]
fn test_training_report_from_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = small_config(temp_dir.path());
    write_csv(&config.data_path)?;

    let mut orchestrator = TrainingOrchestrator::new(config.clone())?;
    let report = orchestrator.run()?;

    assert_eq!(orchestrator.stage(), Some(TrainingStage::Persisted));
    assert_eq!(report.n_loaded, 77);
    assert_eq!(report.n_missing, 1);
    assert_eq!(report.n_duplicates, 1);
    assert_eq!(report.n_train + report.n_validation, 75);
    assert_eq!(report.n_validation, 15);
    assert!(report.n_features <= config.vectorizer.max_features);

    let evaluation = report.evaluation.expect("validation subset is not empty");
    assert_eq!(evaluation.n_samples, 15);
    assert!(evaluation.accuracy > 0.5);
    Ok(())
}

#[test]
fn test_label_distribution_before_split() {
    let raw: Vec<RawReview> = [1.0, 1.0, 3.0, 5.0, 5.0, 5.0]
        .iter()
        .enumerate()
        .map(|(i, &rating)| RawReview::new(rating, format!("review number {i}")))
        .collect();

    let (reviews, _) = dataset::clean(raw);
    let distribution = dataset::label_distribution(&dataset::derive_labels(&reviews));

    assert_eq!(distribution.len(), 3);
    assert_eq!(distribution[&Sentiment::Negative], 2);
    assert_eq!(distribution[&Sentiment::Neutral], 1);
    assert_eq!(distribution[&Sentiment::Positive], 3);
}

#[test]
fn test_missing_data_file_fails_without_bundle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = small_config(temp_dir.path());

    let mut orchestrator = TrainingOrchestrator::new(config.clone())?;
    assert!(orchestrator.run().is_err());
    assert!(!config.output_dir.exists());
    Ok(())
}
