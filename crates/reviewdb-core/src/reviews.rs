use chrono::NaiveDate;
use serde::Serialize;

/// Label assigned when a review has no text to classify.
pub const NEUTRAL_LABEL: &str = "neutral";

/// Top-scoring label from a single-label text classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Model confidence in `[0.0, 1.0]`.
    pub score: f64,
}

impl ClassificationResult {
    /// The `{label: "neutral", score: 0.0}` result used for empty text.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: NEUTRAL_LABEL.to_string(),
            score: 0.0,
        }
    }
}

/// Sentiment and emotion classification for one review.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub sentiment: ClassificationResult,
    pub emotion: ClassificationResult,
}

impl Enrichment {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            sentiment: ClassificationResult::neutral(),
            emotion: ClassificationResult::neutral(),
        }
    }
}

/// Constant tags stamped on every row produced by this pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTags {
    /// Sales channel name. Also used as the `product_id` prefix.
    pub sales_channel: String,
    pub brand: String,
}

impl Default for ReviewTags {
    fn default() -> Self {
        Self {
            sales_channel: "TiktokMall".to_string(),
            brand: "Bodypack".to_string(),
        }
    }
}

/// A marketplace review flattened and enriched for storage in `product_reviews`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedReview {
    /// Marketplace review id. Not unique across runs.
    pub review_id: Option<String>,
    pub order_id: Option<String>,
    pub reply_date: Option<NaiveDate>,
    pub review_text: Option<String>,
    /// Star rating as reported by the marketplace (1-5).
    pub rating: Option<i32>,
    pub review_date: Option<NaiveDate>,
    pub username: Option<String>,
    pub product_name: Option<String>,
    /// Sales channel prefix followed by the marketplace product id, e.g. `"TiktokMall123"`.
    pub product_id: String,
    pub product_image: Option<String>,
    pub sentiment: ClassificationResult,
    pub emotion: ClassificationResult,
    pub sku_specification: Option<String>,
    pub sales_channel: String,
    pub brand: String,
    /// Local date of the run that produced this row; shared by the whole batch.
    pub scrape_date: NaiveDate,
}
