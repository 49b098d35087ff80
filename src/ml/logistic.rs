//! Multinomial logistic regression over sparse features.
//!
//! The model keeps one weight vector and one intercept per class and predicts
//! the class with the highest score. Fitting minimizes the sample-weighted
//! cross-entropy plus an L2 penalty on the weights (intercepts are not
//! penalized) with L-BFGS and a backtracking line search.
//!
//! The objective is normalized by the total sample weight:
//!
//! ```text
//! J(W, b) = Σ_i (s_i / S) · CE_i  +  ||W||² / (2 · C · S)
//! ```
//!
//! where `s_i` is the weight of sample `i`, `S = Σ s_i`, and `C` is the
//! inverse regularization strength.

use std::collections::VecDeque;

use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::ml::sparse::SparseVector;

/// Relative decrease of the objective below which fitting stops.
const FTOL: f64 = 2.220446049250313e-9;

/// Armijo sufficient decrease constant.
const ARMIJO_C1: f64 = 1e-4;

/// Maximum number of step halvings per line search.
const MAX_LINE_SEARCH_STEPS: usize = 40;

/// How each training sample is weighted in the loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Weight samples inversely to their class frequency.
    #[default]
    Balanced,
    /// Every sample counts the same.
    Uniform,
}

impl ClassWeight {
    /// Per-sample weights for `labels` over `n_classes` classes.
    ///
    /// Balanced weights are `n_samples / (n_present_classes * n_class_samples)`.
    pub fn sample_weights(&self, labels: &[usize], n_classes: usize) -> Vec<f64> {
        match self {
            ClassWeight::Uniform => vec![1.0; labels.len()],
            ClassWeight::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &label in labels {
                    counts[label] += 1;
                }
                let present = counts.iter().filter(|&&c| c > 0).count();
                let n = labels.len() as f64;
                labels
                    .iter()
                    .map(|&label| n / (present as f64 * counts[label] as f64))
                    .collect()
            }
        }
    }
}

/// Hyperparameters for [`LogisticRegression`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Iteration cap for the optimizer.
    pub max_iter: usize,

    /// Inverse L2 regularization strength.
    pub c: f64,

    /// Stop once the largest gradient component falls below this.
    pub tol: f64,

    pub class_weight: ClassWeight,

    /// Number of correction pairs kept by L-BFGS.
    pub history_size: usize,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        LogisticRegressionConfig {
            max_iter: 1000,
            c: 1.0,
            tol: 1e-4,
            class_weight: ClassWeight::Balanced,
            history_size: 10,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(SentimentError::invalid_config("max_iter must be at least 1"));
        }
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SentimentError::invalid_config(format!(
                "C must be a positive number, got {}",
                self.c
            )));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(SentimentError::invalid_config(format!(
                "tol must be non-negative, got {}",
                self.tol
            )));
        }
        if self.history_size == 0 {
            return Err(SentimentError::invalid_config(
                "history_size must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Outcome of a call to [`LogisticRegression::fit`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    /// Whether a stopping tolerance was met before the iteration cap.
    pub converged: bool,
    /// Final value of the regularized objective.
    pub loss: f64,
}

/// Multinomial logistic regression classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    n_features: usize,
    n_classes: usize,
    /// Row-major `n_classes x n_features` weight matrix.
    weights: Vec<f64>,
    intercepts: Vec<f64>,
}

/// Training data borrowed for the duration of one fit.
struct Problem<'a> {
    features: &'a [SparseVector],
    labels: &'a [usize],
    /// Sample weights divided by their sum.
    sample_weights: Vec<f64>,
    /// L2 strength on the weight matrix, `1 / (C * S)`.
    alpha: f64,
    n_features: usize,
    n_classes: usize,
}

impl Problem<'_> {
    fn dim(&self) -> usize {
        self.n_classes * (self.n_features + 1)
    }

    /// Objective value at `theta`; writes the gradient into `grad`.
    ///
    /// `theta` holds the weight matrix followed by the intercepts.
    fn evaluate(&self, theta: &[f64], grad: &mut [f64]) -> f64 {
        let (k, d) = (self.n_classes, self.n_features);
        let (weights, intercepts) = theta.split_at(k * d);
        grad.fill(0.0);

        let mut loss = 0.0;
        let mut scores = vec![0.0; k];
        for ((x, &y), &sw) in self
            .features
            .iter()
            .zip(self.labels)
            .zip(&self.sample_weights)
        {
            for c in 0..k {
                scores[c] = intercepts[c] + x.dot_dense(&weights[c * d..(c + 1) * d]);
            }
            let lse = log_sum_exp(&scores);
            loss += sw * (lse - scores[y]);

            for c in 0..k {
                let p = (scores[c] - lse).exp();
                let coeff = sw * (p - if c == y { 1.0 } else { 0.0 });
                if coeff != 0.0 {
                    let row = &mut grad[c * d..(c + 1) * d];
                    for (j, value) in x.iter() {
                        row[j] += coeff * value;
                    }
                    grad[k * d + c] += coeff;
                }
            }
        }

        let mut penalty = 0.0;
        for (g, w) in grad[..k * d].iter_mut().zip(weights) {
            penalty += w * w;
            *g += self.alpha * w;
        }
        loss + 0.5 * self.alpha * penalty
    }
}

/// One L-BFGS correction pair.
struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

impl LogisticRegression {
    /// Create an unfitted classifier.
    pub fn new(config: LogisticRegressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(LogisticRegression {
            config,
            n_features: 0,
            n_classes: 0,
            weights: Vec::new(),
            intercepts: Vec::new(),
        })
    }

    /// Fit on feature vectors and class indices.
    ///
    /// Hitting the iteration cap is not an error: the weights reached at the
    /// cutoff are kept and the summary reports `converged: false`.
    pub fn fit(&mut self, features: &[SparseVector], labels: &[usize]) -> Result<FitSummary> {
        if features.len() != labels.len() {
            return Err(SentimentError::invalid_argument(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(SentimentError::empty_dataset(
                "cannot fit classifier on zero samples",
            ));
        }

        let n_features = features[0].dim();
        if let Some(bad) = features.iter().find(|x| x.dim() != n_features) {
            return Err(SentimentError::invalid_argument(format!(
                "feature dimension {} does not match {}",
                bad.dim(),
                n_features
            )));
        }
        let n_classes = labels.iter().max().map_or(0, |&max| max + 1);
        if n_classes < 2 {
            return Err(SentimentError::invalid_argument(
                "at least two classes are required to fit a classifier",
            ));
        }

        let raw_weights = self.config.class_weight.sample_weights(labels, n_classes);
        let weight_sum: f64 = raw_weights.iter().sum();
        let problem = Problem {
            features,
            labels,
            sample_weights: raw_weights.iter().map(|w| w / weight_sum).collect(),
            alpha: 1.0 / (self.config.c * weight_sum),
            n_features,
            n_classes,
        };

        debug!(
            "Fitting logistic regression: {} samples, {} features, {} classes",
            features.len(),
            n_features,
            n_classes
        );

        let (theta, summary) = self.minimize(&problem);
        let (weights, intercepts) = theta.split_at(n_classes * n_features);

        self.n_features = n_features;
        self.n_classes = n_classes;
        self.weights = weights.to_vec();
        self.intercepts = intercepts.to_vec();

        if summary.converged {
            info!(
                "Classifier converged after {} iterations (loss {:.6})",
                summary.iterations, summary.loss
            );
        } else {
            warn!(
                "Classifier did not converge within {} iterations (loss {:.6}); keeping current weights",
                summary.iterations, summary.loss
            );
        }

        Ok(summary)
    }

    /// L-BFGS with Armijo backtracking, starting from zero.
    fn minimize(&self, problem: &Problem<'_>) -> (Vec<f64>, FitSummary) {
        let dim = problem.dim();
        let mut theta = vec![0.0; dim];
        let mut grad = vec![0.0; dim];
        let mut loss = problem.evaluate(&theta, &mut grad);

        let mut history: VecDeque<Correction> = VecDeque::with_capacity(self.config.history_size);
        let mut candidate = vec![0.0; dim];
        let mut candidate_grad = vec![0.0; dim];
        let mut iterations = 0;
        let mut converged = inf_norm(&grad) <= self.config.tol;

        while !converged && iterations < self.config.max_iter {
            iterations += 1;

            let mut direction = two_loop_direction(&grad, &history);
            let mut slope = dot(&direction, &grad);
            if slope >= 0.0 {
                history.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = -dot(&grad, &grad);
            }

            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_LINE_SEARCH_STEPS {
                for ((c, t), d) in candidate.iter_mut().zip(&theta).zip(&direction) {
                    *c = t + step * d;
                }
                let value = problem.evaluate(&candidate, &mut candidate_grad);
                if value.is_finite() && value <= loss + ARMIJO_C1 * step * slope {
                    accepted = Some(value);
                    break;
                }
                step *= 0.5;
            }

            let Some(new_loss) = accepted else {
                debug!("Line search made no progress at iteration {iterations}");
                break;
            };

            let s: Vec<f64> = candidate.iter().zip(&theta).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = candidate_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > 1e-10 {
                if history.len() == self.config.history_size {
                    history.pop_front();
                }
                history.push_back(Correction { s, y, rho: 1.0 / sy });
            }

            let reduction = (loss - new_loss) / loss.abs().max(new_loss.abs()).max(1.0);
            std::mem::swap(&mut theta, &mut candidate);
            std::mem::swap(&mut grad, &mut candidate_grad);
            loss = new_loss;

            trace!("iteration {iterations}: loss {loss:.8}, step {step}");

            converged = inf_norm(&grad) <= self.config.tol || reduction <= FTOL;
        }

        (
            theta,
            FitSummary {
                iterations,
                converged,
                loss,
            },
        )
    }

    /// Raw per-class scores for one feature vector.
    pub fn decision_function(&self, features: &SparseVector) -> Result<Vec<f64>> {
        self.check_input(features)?;
        let d = self.n_features;
        Ok((0..self.n_classes)
            .map(|c| self.intercepts[c] + features.dot_dense(&self.weights[c * d..(c + 1) * d]))
            .collect())
    }

    /// Softmax class probabilities for one feature vector.
    pub fn predict_proba(&self, features: &SparseVector) -> Result<Vec<f64>> {
        let scores = self.decision_function(features)?;
        let lse = log_sum_exp(&scores);
        Ok(scores.iter().map(|s| (s - lse).exp()).collect())
    }

    /// Most likely class for one feature vector; ties go to the lowest index.
    pub fn predict_one(&self, features: &SparseVector) -> Result<usize> {
        let scores = self.decision_function(features)?;
        Ok(argmax(&scores))
    }

    /// Most likely class for each feature vector, in input order.
    pub fn predict(&self, features: &[SparseVector]) -> Result<Vec<usize>> {
        features.par_iter().map(|x| self.predict_one(x)).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.n_classes > 0
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Weight vector of class `class`.
    pub fn coefficients(&self, class: usize) -> Option<&[f64]> {
        let d = self.n_features;
        (class < self.n_classes).then(|| &self.weights[class * d..(class + 1) * d])
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    /// Check that the stored parameters agree with the declared shape.
    pub fn validate_shape(&self) -> Result<()> {
        if self.weights.len() != self.n_classes * self.n_features
            || self.intercepts.len() != self.n_classes
        {
            return Err(SentimentError::artifact_corrupt(format!(
                "classifier parameters do not match {} classes x {} features",
                self.n_classes, self.n_features
            )));
        }
        Ok(())
    }

    fn check_input(&self, features: &SparseVector) -> Result<()> {
        if !self.is_fitted() {
            return Err(SentimentError::unfitted("LogisticRegression"));
        }
        if features.dim() != self.n_features {
            return Err(SentimentError::invalid_argument(format!(
                "expected {} features, got {}",
                self.n_features,
                features.dim()
            )));
        }
        Ok(())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn inf_norm(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

fn log_sum_exp(scores: &[f64]) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max + scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln()
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Approximate `-H⁻¹ g` from the stored correction pairs.
fn two_loop_direction(grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for pair in history.iter().rev() {
        let a = pair.rho * dot(&pair.s, &q);
        for (qi, yi) in q.iter_mut().zip(&pair.y) {
            *qi -= a * yi;
        }
        alphas.push(a);
    }

    if let Some(last) = history.back() {
        let gamma = dot(&last.s, &last.y) / dot(&last.y, &last.y);
        for qi in q.iter_mut() {
            *qi *= gamma;
        }
    }

    for (pair, a) in history.iter().zip(alphas.iter().rev()) {
        let b = pair.rho * dot(&pair.y, &q);
        for (qi, si) in q.iter_mut().zip(&pair.s) {
            *qi += (a - b) * si;
        }
    }

    for qi in q.iter_mut() {
        *qi = -*qi;
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(dim: usize, entries: &[(usize, f64)]) -> SparseVector {
        let mut v = SparseVector::from_entries(dim, entries.iter().copied());
        v.normalize_l2();
        v
    }

    /// Three well separated classes, each marked by its own feature.
    fn separable() -> (Vec<SparseVector>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let class = i % 3;
            let noise = 3 + (i % 2);
            features.push(vector(5, &[(class, 1.0), (noise, 0.3)]));
            labels.push(class);
        }
        (features, labels)
    }

    #[test]
    fn test_fit_and_predict() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        let summary = model.fit(&features, &labels).unwrap();

        assert!(summary.converged);
        assert!(summary.loss.is_finite());
        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_features(), 5);
        assert_eq!(model.predict(&features).unwrap(), labels);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        model.fit(&features, &labels).unwrap();

        let proba = model.predict_proba(&features[0]).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(argmax(&proba), labels[0]);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let (features, labels) = separable();
        let weights = ClassWeight::Balanced.sample_weights(&labels, 3);
        let sum: f64 = weights.iter().sum();
        let problem = Problem {
            features: &features,
            labels: &labels,
            sample_weights: weights.iter().map(|w| w / sum).collect(),
            alpha: 1.0 / sum,
            n_features: 5,
            n_classes: 3,
        };

        let theta: Vec<f64> = (0..problem.dim()).map(|i| (i as f64 * 0.37).sin()).collect();
        let mut grad = vec![0.0; problem.dim()];
        problem.evaluate(&theta, &mut grad);

        let eps = 1e-6;
        let mut scratch = vec![0.0; problem.dim()];
        for i in 0..problem.dim() {
            let mut plus = theta.clone();
            plus[i] += eps;
            let mut minus = theta.clone();
            minus[i] -= eps;
            let numeric = (problem.evaluate(&plus, &mut scratch)
                - problem.evaluate(&minus, &mut scratch))
                / (2.0 * eps);
            assert!((numeric - grad[i]).abs() < 1e-6, "component {i}");
        }
    }

    #[test]
    fn test_balanced_weights() {
        let weights = ClassWeight::Balanced.sample_weights(&[0, 0, 0, 1], 2);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[3] - 2.0).abs() < 1e-12);

        // Only two classes are present, so k = 2.
        let weights = ClassWeight::Balanced.sample_weights(&[0, 2, 2], 3);
        assert!((weights[0] - 1.5).abs() < 1e-12);
        assert!((weights[1] - 0.75).abs() < 1e-12);

        assert_eq!(ClassWeight::Uniform.sample_weights(&[0, 1], 2), vec![1.0, 1.0]);
    }

    #[test]
    fn test_balanced_weighting_favours_minority_on_zero_vector() {
        // Class 1 is rare but carries the same total weight as class 0, so on
        // a featureless input the intercepts should be nearly equal.
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            features.push(SparseVector::zeros(2));
            labels.push(if i < 36 { 0 } else { 1 });
        }
        let mut balanced = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        balanced.fit(&features, &labels).unwrap();
        let intercepts = balanced.intercepts();
        assert!((intercepts[0] - intercepts[1]).abs() < 1e-3);

        let mut uniform = LogisticRegression::new(LogisticRegressionConfig {
            class_weight: ClassWeight::Uniform,
            ..LogisticRegressionConfig::default()
        })
        .unwrap();
        uniform.fit(&features, &labels).unwrap();
        assert!(uniform.intercepts()[0] > uniform.intercepts()[1] + 1.0);
        assert_eq!(uniform.predict_one(&SparseVector::zeros(2)).unwrap(), 0);
    }

    #[test]
    fn test_iteration_cap_keeps_weights() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(LogisticRegressionConfig {
            max_iter: 1,
            tol: 0.0,
            ..LogisticRegressionConfig::default()
        })
        .unwrap();
        let summary = model.fit(&features, &labels).unwrap();

        assert_eq!(summary.iterations, 1);
        assert!(!summary.converged);
        assert!(model.is_fitted());
        assert!(model.intercepts().len() == 3);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (features, labels) = separable();
        let mut a = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        let mut b = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        a.fit(&features, &labels).unwrap();
        b.fit(&features, &labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_argmax_ties_pick_first() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), 1);
    }

    #[test]
    fn test_errors() {
        let model = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        assert!(matches!(
            model.predict_one(&SparseVector::zeros(3)),
            Err(SentimentError::UnfittedComponent(_))
        ));

        let mut model = LogisticRegression::new(LogisticRegressionConfig::default()).unwrap();
        assert!(model.fit(&[], &[]).is_err());
        assert!(model.fit(&[SparseVector::zeros(2)], &[0, 1]).is_err());
        assert!(
            model
                .fit(&[SparseVector::zeros(2), SparseVector::zeros(2)], &[0, 0])
                .is_err()
        );

        let (features, labels) = separable();
        model.fit(&features, &labels).unwrap();
        assert!(model.predict_one(&SparseVector::zeros(4)).is_err());

        assert!(
            LogisticRegression::new(LogisticRegressionConfig {
                c: 0.0,
                ..LogisticRegressionConfig::default()
            })
            .is_err()
        );
    }
}
