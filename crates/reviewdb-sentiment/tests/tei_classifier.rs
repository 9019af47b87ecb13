//! Integration tests for `TeiClassifier` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reviewdb_sentiment::{
    EnrichmentClassifier, SentimentError, TeiClassifier, TextClassifier, EMOTION_MODEL,
    SENTIMENT_MODEL,
};

fn test_classifier(server: &MockServer, model: &str) -> TeiClassifier {
    TeiClassifier::new(model, &server.uri(), 5).expect("client construction should not fail")
}

#[tokio::test]
async fn classify_returns_highest_scoring_label() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({"inputs": "Barang bagus sekali"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"label": "neutral", "score": 0.03},
            {"label": "positive", "score": 0.95},
            {"label": "negative", "score": 0.02}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = test_classifier(&server, SENTIMENT_MODEL);
    let result = classifier
        .classify("Barang bagus sekali")
        .await
        .expect("should classify");

    assert_eq!(result.label, "positive");
    assert!((result.score - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn classify_trailing_slash_in_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"label": "love", "score": 0.7}])),
        )
        .mount(&server)
        .await;

    let classifier = TeiClassifier::new(EMOTION_MODEL, &format!("{}/", server.uri()), 5).unwrap();
    let result = classifier.classify("suka banget").await.unwrap();
    assert_eq!(result.label, "love");
}

#[tokio::test]
async fn classify_server_error_is_tei_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = test_classifier(&server, SENTIMENT_MODEL)
        .classify("jelek")
        .await;
    assert!(
        matches!(result, Err(SentimentError::Tei(ref m)) if m.contains("500")),
        "expected Tei status error, got: {result:?}"
    );
}

#[tokio::test]
async fn classify_empty_predictions_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = test_classifier(&server, EMOTION_MODEL)
        .classify("biasa saja")
        .await;
    assert!(
        matches!(result, Err(SentimentError::EmptyPrediction { ref model }) if model == EMOTION_MODEL),
        "expected EmptyPrediction, got: {result:?}"
    );
}

#[tokio::test]
async fn classify_malformed_body_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "overloaded"})))
        .mount(&server)
        .await;

    let result = test_classifier(&server, SENTIMENT_MODEL)
        .classify("oke")
        .await;
    assert!(matches!(result, Err(SentimentError::Tei(_))));
}

#[tokio::test]
async fn enrich_uses_both_servers() {
    let sentiment_server = MockServer::start().await;
    let emotion_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"label": "negative", "score": 0.9}])),
        )
        .expect(1)
        .mount(&sentiment_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"label": "anger", "score": 0.6}])),
        )
        .expect(1)
        .mount(&emotion_server)
        .await;

    let enricher = EnrichmentClassifier::new(
        test_classifier(&sentiment_server, SENTIMENT_MODEL),
        test_classifier(&emotion_server, EMOTION_MODEL),
    );
    let enrichment = enricher
        .enrich(Some("R7"), Some("Barang rusak, kecewa"))
        .await
        .unwrap();

    assert_eq!(enrichment.sentiment.label, "negative");
    assert_eq!(enrichment.emotion.label, "anger");
}

#[tokio::test]
async fn enrich_blank_text_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let enricher = EnrichmentClassifier::new(
        test_classifier(&server, SENTIMENT_MODEL),
        test_classifier(&server, EMOTION_MODEL),
    );
    let enrichment = enricher.enrich(Some("R8"), Some("  ")).await.unwrap();
    assert_eq!(enrichment.sentiment.label, "neutral");
    assert_eq!(enrichment.emotion.score, 0.0);
}
