//! Versioned persistence of fitted model components.
//!
//! An [`ArtifactBundle`] is the vectorizer, classifier and label encoder that
//! together reproduce predictions. [`ArtifactStore`] writes each bundle into
//! its own version directory under one base path and moves a `CURRENT`
//! pointer to it atomically.

pub mod bundle;
pub mod store;

pub use bundle::{ArtifactBundle, FORMAT_VERSION, Manifest};
pub use store::ArtifactStore;
