//! Evaluation metrics for multiclass predictions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};

/// Precision, recall and F1 for a single class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose true label is this class.
    pub support: usize,
}

/// Summary of predictions against known labels.
///
/// Precision and recall are reported as 0 for a class that is never predicted
/// or never present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub macro_f1: f64,
    pub n_samples: usize,
    pub classes: Vec<ClassMetrics>,
}

impl ClassificationReport {
    /// Score `predicted` against `actual`. Both hold class indices into
    /// `class_names`.
    pub fn new(actual: &[usize], predicted: &[usize], class_names: &[String]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(SentimentError::invalid_argument(format!(
                "{} labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(SentimentError::empty_dataset("no samples to evaluate"));
        }

        let k = class_names.len();
        let mut true_positive = vec![0usize; k];
        let mut predicted_count = vec![0usize; k];
        let mut support = vec![0usize; k];

        for (&y, &p) in actual.iter().zip(predicted) {
            if y >= k {
                return Err(SentimentError::out_of_range(y, k));
            }
            if p >= k {
                return Err(SentimentError::out_of_range(p, k));
            }
            support[y] += 1;
            predicted_count[p] += 1;
            if y == p {
                true_positive[y] += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let classes: Vec<ClassMetrics> = class_names
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let precision = ratio(true_positive[c], predicted_count[c]);
                let recall = ratio(true_positive[c], support[c]);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support: support[c],
                }
            })
            .collect();

        let correct: usize = true_positive.iter().sum();
        let macro_f1 = if k == 0 {
            0.0
        } else {
            classes.iter().map(|c| c.f1).sum::<f64>() / k as f64
        };

        Ok(ClassificationReport {
            accuracy: ratio(correct, actual.len()),
            macro_f1,
            n_samples: actual.len(),
            classes,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "{:<12} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                class.label, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:<12} {:>29.3} {:>9}", "accuracy", self.accuracy, self.n_samples)?;
        write!(f, "{:<12} {:>29.3} {:>9}", "macro f1", self.macro_f1, self.n_samples)
    }
}
