//! Stratified train/validation splitting.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{Result, SentimentError};

/// Splits labelled samples so that every class keeps its proportion in both
/// the training and the validation subset.
///
/// # Examples
///
/// ```
/// use review_sentiment::ml::StratifiedSplit;
///
/// let labels = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
/// let (train, validation) = StratifiedSplit::new(0.2, 42).unwrap().split(&labels);
/// assert_eq!(train.len(), 8);
/// assert_eq!(validation.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct StratifiedSplit {
    test_size: f64,
    seed: u64,
}

impl StratifiedSplit {
    /// Create a splitter holding out `test_size` of each class.
    pub fn new(test_size: f64, seed: u64) -> Result<Self> {
        if !(0.0..1.0).contains(&test_size) {
            return Err(SentimentError::invalid_config(format!(
                "test_size must be in [0, 1), got {test_size}"
            )));
        }
        Ok(StratifiedSplit { test_size, seed })
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return `(train_indices, validation_indices)`, each sorted ascending.
    ///
    /// A class with a single sample always stays in the training subset, and
    /// a larger class always keeps at least one training sample.
    pub fn split<L: Ord + Copy>(&self, labels: &[L]) -> (Vec<usize>, Vec<usize>) {
        let mut class_indices: BTreeMap<L, Vec<usize>> = BTreeMap::new();
        for (i, &label) in labels.iter().enumerate() {
            class_indices.entry(label).or_default().push(i);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(labels.len());
        let mut validation = Vec::new();

        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);

            let n_class = indices.len();
            let n_validation = if n_class > 1 {
                ((n_class as f64 * self.test_size).round() as usize).min(n_class - 1)
            } else {
                0
            };

            validation.extend_from_slice(&indices[..n_validation]);
            train.extend_from_slice(&indices[n_validation..]);
        }

        train.sort_unstable();
        validation.sort_unstable();
        (train, validation)
    }
}
