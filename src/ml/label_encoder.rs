//! Bijective mapping between label strings and class indices.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};

/// Encodes labels as indices `0..k` in sorted label order.
///
/// Because classes are sorted, the same set of distinct labels always yields
/// the same encoding regardless of input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create an unfitted encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the sorted set of distinct labels.
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        if labels.is_empty() {
            return Err(SentimentError::empty_dataset(
                "cannot fit label encoder on zero labels",
            ));
        }
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    /// Build an encoder from an explicit class list, as stored in an artifact.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(SentimentError::artifact_corrupt("label encoder has no classes"));
        }
        if classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SentimentError::artifact_corrupt(
                "label encoder classes are not sorted and unique",
            ));
        }
        Ok(LabelEncoder { classes })
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.ensure_fitted()?;
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| SentimentError::unknown_label(label))
    }

    /// Encode every label, failing on the first unknown one.
    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.ensure_fitted()?;
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| SentimentError::out_of_range(index, self.classes.len()))
    }

    /// The fitted classes in index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn ensure_fitted(&self) -> Result<()> {
        if self.classes.is_empty() {
            Err(SentimentError::unfitted("LabelEncoder"))
        } else {
            Ok(())
        }
    }
}
