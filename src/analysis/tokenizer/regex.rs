//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, SentimentError};

/// Word-like terms of at least two characters.
pub const TERM_PATTERN: &str = r"\b\w\w+\b";

/// A tokenizer that extracts every non-overlapping match of a pattern.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with the default pattern.
    ///
    /// The default pattern [`TERM_PATTERN`] matches words of two or more word
    /// characters, so single letters never become vocabulary terms.
    pub fn new() -> Result<Self> {
        Self::with_pattern(TERM_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SentimentError::invalid_argument(format!("Invalid regex pattern: {e}"))
        })?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> TokenStream {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| Token::new(mat.as_str(), position))
            .collect();

        Box::new(tokens.into_iter())
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
