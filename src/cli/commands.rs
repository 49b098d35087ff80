//! Command implementations for the review-sentiment CLI.

use std::io::{self, BufRead};

use log::info;

use crate::artifact::ArtifactStore;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, SentimentError};
use crate::inference::{InferenceService, PredictRequest};
use crate::training::{TrainingConfig, TrainingOrchestrator};

/// Execute a CLI command.
pub fn execute_command(args: SentimentArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

/// Build the training configuration from an optional file plus flag overrides.
pub fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };

    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(max_features) = args.max_features {
        config.vectorizer.max_features = max_features;
    }
    if let Some(min_df) = args.min_df {
        config.vectorizer.min_df = min_df;
    }
    if let Some(ngram_min) = args.ngram_min {
        config.vectorizer.ngram_range.0 = ngram_min;
    }
    if let Some(ngram_max) = args.ngram_max {
        config.vectorizer.ngram_range.1 = ngram_max;
    }
    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_iter) = args.max_iter {
        config.classifier.max_iter = max_iter;
    }

    config.validate()?;
    Ok(config)
}

/// Train a model and save it as a new bundle.
fn train(args: &TrainArgs, cli_args: &SentimentArgs) -> Result<()> {
    let config = training_config(args)?;
    info!(
        "Training from {} into {}",
        config.data_path.display(),
        config.output_dir.display()
    );

    let mut orchestrator = TrainingOrchestrator::new(config)?;
    let report = orchestrator.run()?;

    output_result("Training complete", &report, cli_args)
}

/// Classify texts given on the command line or read from stdin.
fn predict(args: &PredictArgs, cli_args: &SentimentArgs) -> Result<()> {
    let store = ArtifactStore::new(args.model.clone());
    let service = match &args.version {
        Some(version) => InferenceService::from_bundle(store.load_version(version)?)?,
        None => InferenceService::load(&store)?,
    };

    let texts = if args.texts.is_empty() {
        read_stdin_lines()?
    } else {
        args.texts.clone()
    };

    let mut predictions = Vec::with_capacity(texts.len());
    for text in texts {
        let response = service.handle(PredictRequest::new(text))?;
        let prediction = if args.proba {
            let scores = service.predict_proba(&response.input_text)?;
            PredictionResult::from_scores(response.input_text, scores)
        } else {
            PredictionResult {
                input_text: response.input_text,
                predicted_sentiment: response.predicted_sentiment,
                probabilities: None,
            }
        };
        predictions.push(prediction);
    }

    let results = PredictionResults {
        version: args
            .version
            .clone()
            .or_else(|| service.version().map(str::to_string)),
        predictions,
    };
    output_result("Predictions", &results, cli_args)
}

fn read_stdin_lines() -> Result<Vec<String>> {
    let lines = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<Vec<String>>>()?;
    let lines: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err(SentimentError::input_validation("no text given on stdin"));
    }
    Ok(lines)
}

/// Show the manifest of a bundle and optionally every stored version.
fn inspect(args: &InspectArgs, cli_args: &SentimentArgs) -> Result<()> {
    let store = ArtifactStore::new(args.model.clone());

    let current = match store.current_version() {
        Ok(version) => Some(version),
        Err(SentimentError::ArtifactMissing(_)) => None,
        Err(e) => return Err(e),
    };
    let target = args.version.clone().or_else(|| current.clone());
    let manifest = match &target {
        Some(version) => Some(store.manifest(version)?),
        None => None,
    };
    let versions = if args.all { store.versions()? } else { Vec::new() };

    if manifest.is_none() && versions.is_empty() {
        return Err(SentimentError::artifact_missing(format!(
            "no bundles under {}",
            store.base_dir().display()
        )));
    }

    output_result(
        "Bundle manifest",
        &InspectResult {
            current,
            manifest,
            versions,
        },
        cli_args,
    )
}
