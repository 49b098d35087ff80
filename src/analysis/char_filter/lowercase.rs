//! Lowercase char filter.

use super::CharFilter;

/// A char filter that lowercases the whole input.
///
/// ASCII input takes a fast path; anything else goes through Unicode-aware
/// lowercasing.
#[derive(Clone, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    /// Create a new lowercase char filter.
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            input.to_ascii_lowercase()
        } else {
            input.to_lowercase()
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_ascii() {
        let filter = LowercaseCharFilter::new();
        assert_eq!(filter.filter("Great PRODUCT"), "great product");
    }

    #[test]
    fn test_lowercase_unicode() {
        let filter = LowercaseCharFilter::new();
        assert_eq!(filter.filter("CAFÉ Über"), "café über");
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LowercaseCharFilter::new().name(), "lowercase");
    }
}
