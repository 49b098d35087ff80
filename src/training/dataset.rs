//! Review records and the cleaning steps applied before training.
//!
//! Reviews are read from CSV as [`RawReview`]s where every field may be
//! missing. [`clean`] drops records without a usable rating or body and
//! removes exact `(rating, text)` duplicates; [`derive_labels`] maps ratings to
//! [`Sentiment`] and builds the document text.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use ahash::AHashSet;
use csv::ReaderBuilder;
use log::{debug, info};

use crate::error::{Result, SentimentError};
use crate::sentiment::Sentiment;
use crate::training::config::DatasetColumns;

/// A review row as read from disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawReview {
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub summary: Option<String>,
}

impl RawReview {
    pub fn new<S: Into<String>>(rating: f64, text: S) -> Self {
        RawReview {
            rating: Some(rating),
            text: Some(text.into()),
            summary: None,
        }
    }

    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A review with both required fields present.
#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub rating: f64,
    pub text: String,
    pub summary: Option<String>,
}

/// A training document with its derived sentiment.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledReview {
    pub text: String,
    pub sentiment: Sentiment,
}

/// Record counts removed by [`clean`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub missing: usize,
    pub duplicates: usize,
}

/// Read reviews from a CSV file with a header row.
pub fn read_csv<P: AsRef<Path>>(path: P, columns: &DatasetColumns) -> Result<Vec<RawReview>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SentimentError::input_validation(format!("cannot open {}: {e}", path.display()))
    })?;
    let reviews = read_csv_from(file, columns)?;
    info!("Loaded {} records from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Read reviews from any CSV source with a header row.
pub fn read_csv_from<R: Read>(reader: R, columns: &DatasetColumns) -> Result<Vec<RawReview>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let rating_idx = position(&columns.rating).ok_or_else(|| {
        SentimentError::invalid_config(format!("rating column '{}' not found", columns.rating))
    })?;
    let text_idx = position(&columns.text).ok_or_else(|| {
        SentimentError::invalid_config(format!("text column '{}' not found", columns.text))
    })?;
    let summary_idx = columns.summary.as_deref().and_then(position);

    let mut reviews = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).filter(|value| !value.is_empty());

        reviews.push(RawReview {
            rating: field(rating_idx)
                .and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|rating| rating.is_finite()),
            text: field(text_idx).map(str::to_string),
            summary: summary_idx.and_then(field).map(str::to_string),
        });
    }

    Ok(reviews)
}

/// Drop records missing a rating or text, then exact `(rating, text)`
/// duplicates, keeping the first occurrence.
pub fn clean(raw: Vec<RawReview>) -> (Vec<Review>, CleanStats) {
    let mut stats = CleanStats::default();
    let mut seen: AHashSet<(u64, String)> = AHashSet::new();
    let mut reviews = Vec::with_capacity(raw.len());

    for record in raw {
        let (Some(rating), Some(text)) = (record.rating, record.text) else {
            stats.missing += 1;
            continue;
        };
        // -0.0 and 0.0 compare equal as ratings.
        let key = if rating == 0.0 { 0.0f64 } else { rating };
        if !seen.insert((key.to_bits(), text.clone())) {
            stats.duplicates += 1;
            continue;
        }
        reviews.push(Review {
            rating,
            text,
            summary: record.summary,
        });
    }

    debug!(
        "Cleaning dropped {} incomplete and {} duplicate records",
        stats.missing, stats.duplicates
    );
    (reviews, stats)
}

/// Label each review and join its summary and body into one document.
pub fn derive_labels(reviews: &[Review]) -> Vec<LabelledReview> {
    reviews
        .iter()
        .map(|review| {
            let summary = review.summary.as_deref().unwrap_or("");
            LabelledReview {
                text: format!("{summary} {}", review.text).trim().to_string(),
                sentiment: Sentiment::from_rating(review.rating),
            }
        })
        .collect()
}

/// Number of documents per sentiment.
pub fn label_distribution(reviews: &[LabelledReview]) -> BTreeMap<Sentiment, usize> {
    let mut distribution = BTreeMap::new();
    for review in reviews {
        *distribution.entry(review.sentiment).or_insert(0) += 1;
    }
    distribution
}
