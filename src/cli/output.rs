//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::artifact::Manifest;
use crate::cli::args::{OutputFormat, SentimentArgs};
use crate::error::Result;
use crate::inference::SentimentScores;
use crate::sentiment::Sentiment;
use crate::training::TrainingReport;

/// One classified text.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub input_text: String,
    pub predicted_sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<(Sentiment, f64)>>,
}

impl PredictionResult {
    pub fn from_scores(input_text: String, scores: SentimentScores) -> Self {
        PredictionResult {
            input_text,
            predicted_sentiment: scores.predicted_sentiment,
            probabilities: Some(scores.probabilities),
        }
    }
}

/// Result of the predict command.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResults {
    pub version: Option<String>,
    pub predictions: Vec<PredictionResult>,
}

/// Result of the inspect command.
#[derive(Debug, Serialize, Deserialize)]
pub struct InspectResult {
    pub current: Option<String>,
    pub manifest: Option<Manifest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

/// Anything the CLI can print in human or JSON form.
pub trait CommandOutput: Serialize {
    /// Human-readable rendering.
    fn render_human(&self) -> String;
}

impl CommandOutput for TrainingReport {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Records: {} loaded, {} incomplete, {} duplicates",
            self.n_loaded, self.n_missing, self.n_duplicates
        );
        let distribution: Vec<String> = self
            .label_distribution
            .iter()
            .map(|(sentiment, count)| format!("{sentiment}: {count}"))
            .collect();
        let _ = writeln!(out, "Labels: {}", distribution.join(", "));
        let _ = writeln!(
            out,
            "Split: {} train / {} validation",
            self.n_train, self.n_validation
        );
        let _ = writeln!(out, "Features: {}", self.n_features);
        let _ = writeln!(
            out,
            "Optimizer: {} iterations, converged: {}, loss {:.6}",
            self.fit.iterations, self.fit.converged, self.fit.loss
        );
        if let Some(evaluation) = &self.evaluation {
            let _ = writeln!(out);
            let _ = writeln!(out, "{evaluation}");
        }
        if let (Some(version), Some(dir)) = (&self.version, &self.bundle_dir) {
            let _ = writeln!(out);
            let _ = write!(out, "Saved bundle {version} to {}", dir.display());
        }
        out
    }
}

impl CommandOutput for PredictionResults {
    fn render_human(&self) -> String {
        let mut lines = Vec::with_capacity(self.predictions.len());
        for prediction in &self.predictions {
            let mut line = format!("{}\t{}", prediction.predicted_sentiment, prediction.input_text);
            if let Some(probabilities) = &prediction.probabilities {
                let scores: Vec<String> = probabilities
                    .iter()
                    .map(|(sentiment, p)| format!("{sentiment}={p:.3}"))
                    .collect();
                line.push_str(&format!("\t[{}]", scores.join(" ")));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl CommandOutput for InspectResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        match &self.current {
            Some(current) => {
                let _ = writeln!(out, "Current version: {current}");
            }
            None => {
                let _ = writeln!(out, "No current version");
            }
        }
        if let Some(manifest) = &self.manifest {
            let _ = writeln!(out, "Version: {}", manifest.version);
            let _ = writeln!(out, "Created: {}", manifest.created_at.to_rfc3339());
            let _ = writeln!(out, "Format: {}", manifest.format_version);
            let _ = writeln!(out, "Features: {}", manifest.n_features);
            let _ = writeln!(out, "Classes: {}", manifest.classes.join(", "));
            if let Some(fit) = &manifest.fit {
                let _ = writeln!(
                    out,
                    "Optimizer: {} iterations, converged: {}",
                    fit.iterations, fit.converged
                );
            }
            if let Some(evaluation) = &manifest.evaluation {
                let _ = writeln!(
                    out,
                    "Validation: accuracy {:.4}, macro F1 {:.4}",
                    evaluation.accuracy, evaluation.macro_f1
                );
            }
        }
        if !self.versions.is_empty() {
            let _ = writeln!(out, "Stored versions:");
            for version in &self.versions {
                let marker = if Some(version) == self.current.as_ref() { "*" } else { " " };
                let _ = writeln!(out, " {marker} {version}");
            }
        }
        out.trim_end().to_string()
    }
}

/// Output a result in the specified format.
pub fn output_result<T: CommandOutput>(message: &str, result: &T, args: &SentimentArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: CommandOutput>(message: &str, result: &T, args: &SentimentArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    println!("{}", result.render_human());
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SentimentArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_rendering() {
        let results = PredictionResults {
            version: None,
            predictions: vec![
                PredictionResult {
                    input_text: "great taste".into(),
                    predicted_sentiment: Sentiment::Positive,
                    probabilities: None,
                },
                PredictionResult {
                    input_text: "meh".into(),
                    predicted_sentiment: Sentiment::Neutral,
                    probabilities: Some(vec![
                        (Sentiment::Negative, 0.2),
                        (Sentiment::Neutral, 0.5),
                        (Sentiment::Positive, 0.3),
                    ]),
                },
            ],
        };

        assert_eq!(
            results.render_human(),
            "Positive\tgreat taste\nNeutral\tmeh\t[Negative=0.200 Neutral=0.500 Positive=0.300]"
        );

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["predictions"][0]["predicted_sentiment"], "Positive");
        assert!(json["predictions"][0].get("probabilities").is_none());
    }

    #[test]
    fn test_inspect_rendering_marks_current() {
        let result = InspectResult {
            current: Some("b".into()),
            manifest: None,
            versions: vec!["a".into(), "b".into()],
        };
        let text = result.render_human();
        assert!(text.contains("Current version: b"));
        assert!(text.contains("   a"));
        assert!(text.contains(" * b"));
    }
}
