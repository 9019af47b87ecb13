//! TEI (Text Embeddings Inference) client for sequence classification.

use std::time::Duration;

use reviewdb_core::ClassificationResult;
use serde::{Deserialize, Serialize};

use crate::classifier::TextClassifier;
use crate::error::SentimentError;

/// Hugging Face model served for three-way Indonesian sentiment.
pub const SENTIMENT_MODEL: &str = "w11wo/indonesian-roberta-base-sentiment-classifier";

/// Hugging Face model served for Indonesian emotion classification.
pub const EMOTION_MODEL: &str = "StevenLimcorn/indonesian-roberta-base-emotion-classifier";

/// Classifier backed by a TEI server's `/predict` endpoint.
///
/// One instance per model; TEI serves a single model per process.
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
}

/// One `{label, score}` entry from a TEI `/predict` response.
#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

impl TeiClassifier {
    /// Create a new `TeiClassifier` for the TEI server at `tei_url`.
    ///
    /// `model` is only used to label log lines and errors.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(model: &str, tei_url: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/predict", tei_url.trim_end_matches('/')),
            model: model.to_owned(),
        })
    }
}

impl TextClassifier for TeiClassifier {
    /// Returns the highest-scoring label. TEI sorts predictions by score, but
    /// the maximum is taken explicitly rather than trusting the order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Tei`] on request failure, non-2xx status, or
    /// an unparseable body, and [`SentimentError::EmptyPrediction`] if TEI
    /// returns an empty list.
    async fn classify(&self, text: &str) -> Result<ClassificationResult, SentimentError> {
        let response = self
            .client
            .post(&self.url)
            .json(&PredictRequest { inputs: text })
            .send()
            .await
            .map_err(|e| SentimentError::Tei(format!("{} request failed: {e}", self.model)))?;

        if !response.status().is_success() {
            return Err(SentimentError::Tei(format!(
                "{} returned status {}",
                self.model,
                response.status()
            )));
        }

        let predictions: Vec<Prediction> = response.json().await.map_err(|e| {
            SentimentError::Tei(format!("{} response parse error: {e}", self.model))
        })?;

        let best = predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| SentimentError::EmptyPrediction {
                model: self.model.clone(),
            })?;

        tracing::debug!(model = %self.model, label = %best.label, score = best.score, "classified text");

        Ok(ClassificationResult {
            label: best.label,
            score: best.score,
        })
    }
}
