//! Regex-based char filter.

use regex::Regex;

use super::CharFilter;
use crate::error::{Result, SentimentError};

/// URL-like substrings: anything starting with `http` or `www` up to the next
/// whitespace.
pub const URL_PATTERN: &str = r"http\S+|www\S+";

/// Runs of digits.
pub const DIGIT_PATTERN: &str = r"\d+";

/// ASCII punctuation characters.
pub const PUNCTUATION_PATTERN: &str = r"[[:punct:]]";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
    name: &'static str,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern).map_err(|e| {
                SentimentError::invalid_argument(format!("Invalid regex pattern: {e}"))
            })?,
            replacement: replacement.to_string(),
            name: "pattern_replace",
        })
    }

    /// Filter that deletes URL-like substrings.
    pub fn urls() -> Result<Self> {
        Ok(Self::new(URL_PATTERN, "")?.with_name("strip_urls"))
    }

    /// Filter that deletes digit runs.
    pub fn digits() -> Result<Self> {
        Ok(Self::new(DIGIT_PATTERN, "")?.with_name("strip_digits"))
    }

    /// Filter that deletes ASCII punctuation.
    pub fn punctuation() -> Result<Self> {
        Ok(Self::new(PUNCTUATION_PATTERN, "")?.with_name("strip_punctuation"))
    }

    /// Set the name reported by [`CharFilter::name`].
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Get the regex pattern used by this filter.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
