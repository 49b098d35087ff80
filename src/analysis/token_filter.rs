//! Token filter implementations for token transformation.
//!
//! Filters receive a token stream and produce a new one. They are chained in
//! an analyzer after the tokenizer:
//!
//! ```text
//! Tokenizer → Stop Words → Stemmer → Normalized text
//! ```
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`stem::StemFilter`] - Reduces words to their stem form
//!
//! # Examples
//!
//! ```
//! use review_sentiment::analysis::token::Token;
//! use review_sentiment::analysis::token_filter::Filter;
//! use review_sentiment::analysis::token_filter::stop::StopFilter;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![Token::new("the", 0), Token::new("battery", 1)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "battery");
//! ```

use crate::analysis::token::TokenStream;

/// Trait for filters that transform token streams.
///
/// Filters are total: they may drop or rewrite tokens but never fail.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> TokenStream;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod stem;
pub mod stop;

pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;
