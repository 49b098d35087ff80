//! Text analysis module.
//!
//! This module provides the text normalization shared by training and
//! inference: char filters, tokenizers, token filters and the analyzers that
//! chain them together. [`TextNormalizer`](normalizer::TextNormalizer) is the
//! fixed review pipeline built from these pieces.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer};
pub use normalizer::TextNormalizer;
pub use token::{Token, TokenStream};
