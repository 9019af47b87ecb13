//! Review enrichment for reviewdb.
//!
//! Classifies Indonesian review text with two independent single-label
//! models (sentiment and emotion) served by Text Embeddings Inference (TEI).
//! Empty text short-circuits to neutral defaults without calling either model.

pub mod classifier;
pub mod error;
pub mod tei;

pub use classifier::{EnrichmentClassifier, TextClassifier};
pub use error::SentimentError;
pub use tei::{TeiClassifier, EMOTION_MODEL, SENTIMENT_MODEL};
