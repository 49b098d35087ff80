//! Sentiment categories and rating-based label derivation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

/// The three sentiment categories a review can be classified into.
///
/// Variants are declared in alphabetical order of their names, which is also
/// the order in which a fitted label encoder assigns their indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Every category, in encoding order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Derive a sentiment from a star rating.
    ///
    /// Ratings at or below 2 are negative, exactly 3 is neutral and anything
    /// else is positive.
    ///
    /// ```
    /// use review_sentiment::sentiment::Sentiment;
    ///
    /// assert_eq!(Sentiment::from_rating(2.0), Sentiment::Negative);
    /// assert_eq!(Sentiment::from_rating(3.0), Sentiment::Neutral);
    /// assert_eq!(Sentiment::from_rating(4.0), Sentiment::Positive);
    /// ```
    pub fn from_rating(rating: f64) -> Self {
        if rating <= 2.0 {
            Sentiment::Negative
        } else if rating == 3.0 {
            Sentiment::Neutral
        } else {
            Sentiment::Positive
        }
    }

    /// The canonical label string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|sentiment| sentiment.as_str() == s)
            .ok_or_else(|| SentimentError::unknown_label(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(Sentiment::from_rating(1.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(2.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(3.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_rating(4.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_rating(5.0), Sentiment::Positive);
    }

    #[test]
    fn test_fractional_ratings() {
        assert_eq!(Sentiment::from_rating(1.5), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(2.5), Sentiment::Positive);
        assert_eq!(Sentiment::from_rating(3.5), Sentiment::Positive);
    }

    #[test]
    fn test_parse_and_display() {
        for sentiment in Sentiment::ALL {
            let parsed: Sentiment = sentiment.to_string().parse().unwrap();
            assert_eq!(parsed, sentiment);
        }

        let err = "positive".parse::<Sentiment>().unwrap_err();
        assert!(matches!(err, SentimentError::UnknownLabel(_)));
    }

    #[test]
    fn test_declaration_order_is_alphabetical() {
        let mut names: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
        let declared = names.clone();
        names.sort();
        assert_eq!(names, declared);
    }
}
