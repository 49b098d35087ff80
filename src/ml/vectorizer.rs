//! TF-IDF vectorizer for text feature extraction.
//!
//! The vectorizer is fitted once on a corpus of normalized training documents.
//! Fitting builds a bounded [`Vocabulary`] of unigrams and n-grams and freezes
//! one smoothed IDF weight per term. Transforming a document then produces an
//! L2-normalized [`SparseVector`] over that vocabulary; terms the vocabulary
//! never saw are dropped.
//!
//! # Examples
//!
//! ```
//! use review_sentiment::ml::{TfIdfVectorizer, VectorizerConfig};
//!
//! let config = VectorizerConfig {
//!     min_df: 1,
//!     ..VectorizerConfig::default()
//! };
//! let mut vectorizer = TfIdfVectorizer::new(config).unwrap();
//! vectorizer.fit(&["great tast", "aw smell", "great smell"]).unwrap();
//!
//! let features = vectorizer.transform_one("great smell").unwrap();
//! assert_eq!(features.dim(), vectorizer.num_features());
//! assert!((features.norm() - 1.0).abs() < 1e-12);
//! ```

use std::fmt;

use ahash::AHashMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::error::{Result, SentimentError};
use crate::ml::sparse::SparseVector;

/// Configuration for [`TfIdfVectorizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum number of terms kept in the vocabulary.
    pub max_features: usize,

    /// Inclusive range of n-gram sizes extracted from each document.
    pub ngram_range: (usize, usize),

    /// Minimum number of documents a term must appear in.
    pub min_df: usize,

    /// Maximum proportion of documents a term may appear in.
    pub max_df: f64,

    /// Replace raw term frequency with `1 + ln(tf)`.
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            max_features: 20_000,
            ngram_range: (1, 2),
            min_df: 5,
            max_df: 1.0,
            sublinear_tf: false,
        }
    }
}

impl VectorizerConfig {
    /// Check that every value is usable for fitting.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(SentimentError::invalid_config(
                "max_features must be greater than 0",
            ));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if self.min_df == 0 {
            return Err(SentimentError::invalid_config(
                "min_df must be at least 1",
            ));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(SentimentError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

/// Ordered mapping from term to feature index.
///
/// Serialized as the list of terms in index order.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Feature index of `term`, if it is part of the vocabulary.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Term stored at `index`.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// All terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether every term maps to a distinct index.
    fn is_consistent(&self) -> bool {
        self.index.len() == self.terms.len()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Vocabulary { terms, index }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("len", &self.terms.len())
            .finish()
    }
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerSnapshot", into = "VectorizerSnapshot")]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Extracts single-word terms before n-grams are formed.
    tokenizer: RegexTokenizer,
    vocabulary: Vocabulary,
    /// Inverse document frequency, one entry per vocabulary term.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

/// Persisted form of a [`TfIdfVectorizer`].
#[derive(Serialize, Deserialize)]
struct VectorizerSnapshot {
    config: VectorizerConfig,
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    n_documents: usize,
}

impl From<TfIdfVectorizer> for VectorizerSnapshot {
    fn from(vectorizer: TfIdfVectorizer) -> Self {
        VectorizerSnapshot {
            config: vectorizer.config,
            vocabulary: vectorizer.vocabulary,
            idf: vectorizer.idf,
            n_documents: vectorizer.n_documents,
        }
    }
}

impl TryFrom<VectorizerSnapshot> for TfIdfVectorizer {
    type Error = SentimentError;

    fn try_from(snapshot: VectorizerSnapshot) -> Result<Self> {
        if !snapshot.vocabulary.is_consistent() {
            return Err(SentimentError::artifact_corrupt(
                "vocabulary contains duplicate terms",
            ));
        }
        if snapshot.vocabulary.len() != snapshot.idf.len() {
            return Err(SentimentError::artifact_corrupt(format!(
                "vocabulary has {} terms but idf table has {} entries",
                snapshot.vocabulary.len(),
                snapshot.idf.len()
            )));
        }

        Ok(TfIdfVectorizer {
            config: snapshot.config,
            tokenizer: RegexTokenizer::new()?,
            vocabulary: snapshot.vocabulary,
            idf: snapshot.idf,
            n_documents: snapshot.n_documents,
        })
    }
}

impl fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("config", &self.config)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

impl PartialEq for TfIdfVectorizer {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.vocabulary == other.vocabulary
            && self.idf == other.idf
            && self.n_documents == other.n_documents
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(TfIdfVectorizer {
            config,
            tokenizer: RegexTokenizer::new()?,
            vocabulary: Vocabulary::default(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    /// Fit the vectorizer on training documents.
    ///
    /// Any previous vocabulary and IDF table are replaced.
    pub fn fit<S>(&mut self, documents: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        if documents.is_empty() {
            return Err(SentimentError::empty_dataset(
                "cannot fit vectorizer on zero documents",
            ));
        }

        let n_documents = documents.len();
        let max_doc_count = self.config.max_df * n_documents as f64;
        if max_doc_count < self.config.min_df as f64 {
            return Err(SentimentError::invalid_config(format!(
                "max_df={} keeps fewer documents than min_df={}",
                self.config.max_df, self.config.min_df
            )));
        }

        let counts: Vec<AHashMap<String, usize>> = documents
            .par_iter()
            .map(|doc| self.term_counts(doc.as_ref()))
            .collect();

        // Aggregated (document frequency, corpus frequency) per term.
        let mut stats: AHashMap<String, (usize, usize)> = AHashMap::new();
        for doc_counts in counts {
            for (term, count) in doc_counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }
        let n_candidates = stats.len();

        let mut retained: Vec<(String, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= self.config.min_df && *df as f64 <= max_doc_count)
            .map(|(term, (df, total))| (term, df, total))
            .collect();
        retained.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        retained.truncate(self.config.max_features);

        if retained.is_empty() {
            return Err(SentimentError::empty_dataset(format!(
                "no terms left after pruning {n_candidates} candidates with min_df={}",
                self.config.min_df
            )));
        }

        let n = n_documents as f64;
        let idf: Vec<f64> = retained
            .iter()
            .map(|(_, df, _)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let terms: Vec<String> = retained.into_iter().map(|(term, _, _)| term).collect();

        debug!("Vectorizer considered {n_candidates} candidate terms");
        info!(
            "Fitted vectorizer on {} documents: {} features",
            n_documents,
            terms.len()
        );

        self.vocabulary = Vocabulary::from(terms);
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform documents into TF-IDF feature vectors, preserving order.
    pub fn transform<S>(&self, documents: &[S]) -> Result<Vec<SparseVector>>
    where
        S: AsRef<str> + Sync,
    {
        self.ensure_fitted()?;
        Ok(documents
            .par_iter()
            .map(|doc| self.vectorize(doc.as_ref()))
            .collect())
    }

    /// Transform a single document into a TF-IDF feature vector.
    pub fn transform_one(&self, document: &str) -> Result<SparseVector> {
        self.ensure_fitted()?;
        Ok(self.vectorize(document))
    }

    /// Fit on `documents` and return their feature vectors.
    pub fn fit_transform<S>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>>
    where
        S: AsRef<str> + Sync,
    {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Whether [`fit`](Self::fit) has completed.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// IDF weight per feature index.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Dimension of produced feature vectors.
    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    fn ensure_fitted(&self) -> Result<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(SentimentError::unfitted("TfIdfVectorizer"))
        }
    }

    /// Extract the unigram and n-gram terms of a document.
    fn terms(&self, document: &str) -> Vec<String> {
        let words: Vec<String> = self.tokenizer.tokenize(document).map(|t| t.text).collect();
        let (min_n, max_n) = self.config.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(words.len()) {
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    fn term_counts(&self, document: &str) -> AHashMap<String, usize> {
        let mut counts = AHashMap::new();
        for term in self.terms(document) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }

    fn vectorize(&self, document: &str) -> SparseVector {
        let mut counts: AHashMap<usize, usize> = AHashMap::new();
        for term in self.terms(document) {
            if let Some(index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        let entries = counts.into_iter().map(|(index, count)| {
            let tf = if self.config.sublinear_tf {
                1.0 + (count as f64).ln()
            } else {
                count as f64
            };
            (index, tf * self.idf[index])
        });

        let mut vector = SparseVector::from_entries(self.num_features(), entries);
        vector.normalize_l2();
        vector
    }
}
