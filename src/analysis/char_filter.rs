//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the raw text before it reaches the tokenizer. They
//! are applied in the order they were added to a pipeline, so a lowercase
//! filter placed first lets every later pattern assume lowercase input.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode-aware lowercasing
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//!
//! # Examples
//!
//! ```
//! use review_sentiment::analysis::char_filter::CharFilter;
//! use review_sentiment::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::digits().unwrap();
//! assert_eq!(filter.filter("bought 2 in 2024"), "bought  in ");
//! ```

/// Trait for character filters that transform text before tokenization.
///
/// Char filters cannot fail: every input maps to some output string.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod pattern_replace;

pub use lowercase::LowercaseCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
