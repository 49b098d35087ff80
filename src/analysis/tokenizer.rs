//! Tokenizer implementations for text analysis.
//!
//! Tokenizers split (already char-filtered) text into a stream of tokens.
//!
//! # Available Tokenizers
//!
//! - [`whitespace::WhitespaceTokenizer`] - Splits on Unicode whitespace
//! - [`regex::RegexTokenizer`] - Extracts every match of a regex pattern
//!
//! # Examples
//!
//! ```
//! use review_sentiment::analysis::tokenizer::Tokenizer;
//! use review_sentiment::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("works  great").collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so a tokenizer can be shared by every
/// inference call.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> TokenStream;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod whitespace;

pub use self::regex::RegexTokenizer;
pub use whitespace::WhitespaceTokenizer;
