//! Sentiment + emotion enrichment for a single review.

use std::future::Future;

use reviewdb_core::{ClassificationResult, Enrichment};

use crate::error::SentimentError;

/// A single-label text classifier returning its top label and confidence.
pub trait TextClassifier {
    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ClassificationResult, SentimentError>> + Send;
}

/// Runs the sentiment and emotion classifiers over one review's text.
///
/// Constructed once at startup and borrowed by the pipeline for the whole run.
pub struct EnrichmentClassifier<S, E> {
    sentiment: S,
    emotion: E,
}

impl<S, E> EnrichmentClassifier<S, E>
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    #[must_use]
    pub fn new(sentiment: S, emotion: E) -> Self {
        Self { sentiment, emotion }
    }

    /// Classify a review's text.
    ///
    /// Missing, empty, or whitespace-only text returns [`Enrichment::neutral`]
    /// without invoking either model. Otherwise sentiment then emotion are
    /// each classified once.
    ///
    /// # Errors
    ///
    /// Returns the first [`SentimentError`] from either classifier. A failed
    /// classification is never downgraded to a neutral result.
    pub async fn enrich(
        &self,
        review_id: Option<&str>,
        text: Option<&str>,
    ) -> Result<Enrichment, SentimentError> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            tracing::info!(
                review_id = review_id.unwrap_or("<unknown>"),
                "skipping analysis for review with empty text"
            );
            return Ok(Enrichment::neutral());
        };

        let sentiment = self.sentiment.classify(text).await?;
        let emotion = self.emotion.classify(text).await?;

        Ok(Enrichment { sentiment, emotion })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedClassifier {
        label: &'static str,
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: &'static str, score: f64) -> Self {
            Self {
                label,
                score,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassificationResult, SentimentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ClassificationResult {
                label: self.label.to_string(),
                score: self.score,
            })
        }
    }

    struct FailingClassifier;

    impl TextClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassificationResult, SentimentError> {
            Err(SentimentError::Tei("model offline".to_string()))
        }
    }

    fn classifier() -> EnrichmentClassifier<FixedClassifier, FixedClassifier> {
        EnrichmentClassifier::new(
            FixedClassifier::new("positive", 0.95),
            FixedClassifier::new("happy", 0.81),
        )
    }

    #[tokio::test]
    async fn blank_text_returns_neutral_without_model_calls() {
        let enricher = classifier();
        for text in [None, Some(""), Some("   "), Some("\n\t ")] {
            let enrichment = enricher.enrich(Some("R1"), text).await.unwrap();
            assert_eq!(enrichment, Enrichment::neutral(), "text: {text:?}");
        }
        assert_eq!(enricher.sentiment.calls(), 0);
        assert_eq!(enricher.emotion.calls(), 0);
    }

    #[tokio::test]
    async fn text_is_classified_by_both_models() {
        let enricher = classifier();
        let enrichment = enricher
            .enrich(Some("R1"), Some("Barang bagus sekali"))
            .await
            .unwrap();
        assert_eq!(enrichment.sentiment.label, "positive");
        assert_eq!(enrichment.sentiment.score, 0.95);
        assert_eq!(enrichment.emotion.label, "happy");
        assert_eq!(enrichment.emotion.score, 0.81);
        assert_eq!(enricher.sentiment.calls(), 1);
        assert_eq!(enricher.emotion.calls(), 1);
    }

    #[tokio::test]
    async fn classifier_failure_propagates() {
        let enricher =
            EnrichmentClassifier::new(FixedClassifier::new("positive", 0.9), FailingClassifier);
        let result = enricher.enrich(None, Some("jelek")).await;
        assert!(
            matches!(result, Err(SentimentError::Tei(ref m)) if m.contains("offline")),
            "expected Tei error, got: {result:?}"
        );
    }
}
