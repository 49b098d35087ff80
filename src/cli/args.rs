//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// review-sentiment - classify product reviews as Negative, Neutral or Positive
#[derive(Parser, Debug, Clone)]
#[command(name = "review-sentiment")]
#[command(about = "Train and query bag-of-words sentiment models for product reviews")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SentimentArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SentimentArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from a review CSV and save it as a new bundle
    Train(TrainArgs),

    /// Predict the sentiment of review texts
    Predict(PredictArgs),

    /// Show the manifest of a stored bundle
    Inspect(InspectArgs),
}

/// Arguments for training. Flags override values from `--config`.
#[derive(Parser, Debug, Clone, Default)]
pub struct TrainArgs {
    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Review CSV file
    #[arg(short, long, value_name = "CSV_FILE")]
    pub data: Option<PathBuf>,

    /// Artifact store directory
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub output: Option<PathBuf>,

    /// Maximum vocabulary size
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Minimum document frequency of a term
    #[arg(long)]
    pub min_df: Option<usize>,

    /// Smallest n-gram size
    #[arg(long)]
    pub ngram_min: Option<usize>,

    /// Largest n-gram size
    #[arg(long)]
    pub ngram_max: Option<usize>,

    /// Fraction of each class held out for validation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the train/validation split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optimizer iteration cap
    #[arg(long)]
    pub max_iter: Option<usize>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Artifact store directory
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "models")]
    pub model: PathBuf,

    /// Bundle version to load instead of the current one
    #[arg(long)]
    pub version: Option<String>,

    /// Include class probabilities
    #[arg(long)]
    pub proba: bool,

    /// Texts to classify; one per line from stdin when omitted
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Arguments for inspecting a bundle
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Artifact store directory
    #[arg(short, long, value_name = "MODEL_DIR", default_value = "models")]
    pub model: PathBuf,

    /// Bundle version to inspect instead of the current one
    #[arg(long)]
    pub version: Option<String>,

    /// List every stored version
    #[arg(long)]
    pub all: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_args() {
        let args = SentimentArgs::try_parse_from([
            "review-sentiment",
            "train",
            "--data",
            "reviews.csv",
            "--output",
            "models",
            "--min-df",
            "2",
            "--test-size",
            "0.1",
        ])
        .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.data, Some(PathBuf::from("reviews.csv")));
            assert_eq!(train_args.output, Some(PathBuf::from("models")));
            assert_eq!(train_args.min_df, Some(2));
            assert_eq!(train_args.test_size, Some(0.1));
            assert_eq!(train_args.seed, None);
        } else {
            panic!("Expected Train command");
        }
    }

    #[test]
    fn test_predict_args() {
        let args = SentimentArgs::try_parse_from([
            "review-sentiment",
            "predict",
            "--model",
            "/tmp/models",
            "great taste",
            "awful smell",
        ])
        .unwrap();

        if let Command::Predict(predict_args) = args.command {
            assert_eq!(predict_args.model, PathBuf::from("/tmp/models"));
            assert_eq!(predict_args.texts, vec!["great taste", "awful smell"]);
            assert!(!predict_args.proba);
        } else {
            panic!("Expected Predict command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = SentimentArgs::try_parse_from(["review-sentiment", "inspect"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = SentimentArgs::try_parse_from(["review-sentiment", "-vv", "inspect"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args =
            SentimentArgs::try_parse_from(["review-sentiment", "--quiet", "inspect"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            SentimentArgs::try_parse_from(["review-sentiment", "--format", "json", "inspect"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
