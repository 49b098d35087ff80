//! Review text normalization.
//!
//! [`TextNormalizer`] is the one pipeline used to clean review text, both when
//! fitting a model and when serving predictions. Any difference between the
//! two would make identical input produce different features, so the steps
//! are fixed:
//!
//! 1. lowercase
//! 2. remove URL-like substrings (`http…`/`www…` up to whitespace)
//! 3. remove digit runs
//! 4. remove ASCII punctuation
//! 5. split on whitespace
//! 6. drop English stop words
//! 7. Porter-stem each remaining token
//! 8. join with single spaces
//!
//! # Examples
//!
//! ```
//! use review_sentiment::analysis::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new().unwrap();
//! assert_eq!(
//!     normalizer.normalize("The batteries were AMAZING!!! See http://x.io"),
//!     "batteri amaz see"
//! );
//! assert_eq!(normalizer.normalize("the and of"), "");
//! ```

use std::sync::Arc;

use rayon::prelude::*;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::{LowercaseCharFilter, PatternReplaceCharFilter};
use crate::analysis::token_filter::{StemFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Deterministic cleaning and tokenization for review text.
#[derive(Clone, Debug)]
pub struct TextNormalizer {
    analyzer: PipelineAnalyzer,
}

impl TextNormalizer {
    /// Build the review normalization pipeline.
    ///
    /// This compiles the filter patterns once; the resulting normalizer is
    /// immutable and can be shared across threads.
    pub fn new() -> Result<Self> {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::urls()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::digits()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::punctuation()?))
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(StemFilter::new()))
            .with_name("review_normalizer");

        Ok(Self { analyzer })
    }

    /// Normalized tokens of `text`, in order.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.analyzer
            .analyze(text)
            .filter(|token| !token.is_stopped())
            .map(|token| token.text)
            .collect()
    }

    /// Normalize `text` into a single space-separated string.
    ///
    /// Never fails: empty or all-stopword input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Normalize many texts in parallel, preserving input order.
    pub fn normalize_all<S>(&self, texts: &[S]) -> Vec<String>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.normalize(text.as_ref()))
            .collect()
    }

    /// The underlying analyzer.
    pub fn analyzer(&self) -> &PipelineAnalyzer {
        &self.analyzer
    }
}
