//! Normalization from raw review API records to [`reviewdb_core::EnrichedReview`].

use chrono::{DateTime, Local, NaiveDate};
use reviewdb_core::{EnrichedReview, Enrichment, ReviewTags};
use serde_json::Value;

use crate::error::ScraperError;
use crate::types::{RawRating, RawReview, RawText};

/// Placeholder used in error messages for records without a review id.
const UNKNOWN_REVIEW_ID: &str = "<unknown>";

/// Converts an epoch-millisecond timestamp into a calendar date in the
/// process-local time zone.
///
/// Accepts JSON integers, floats (truncated), and strings holding an integer.
/// Returns `None` for a missing or `null` value. Any other shape, or an
/// instant outside chrono's range, is logged and also returns `None`.
#[must_use]
pub fn normalize_date(epoch_millis: Option<&Value>) -> Option<NaiveDate> {
    let value = epoch_millis?;

    #[allow(clippy::cast_possible_truncation)]
    let millis = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    let Some(millis) = millis else {
        tracing::warn!(timestamp = %value, "error converting timestamp: not an integer");
        return None;
    };

    if let Some(utc) = DateTime::from_timestamp_millis(millis) {
        Some(utc.with_timezone(&Local).date_naive())
    } else {
        tracing::warn!(timestamp = millis, "error converting timestamp: out of range");
        None
    }
}

/// Converts a raw star rating to an integer.
///
/// A rating that is not a whole number (`4.5`, `"lima"`) is logged and stored
/// as `None`; the review itself is kept.
#[must_use]
pub fn normalize_rating(rating: Option<&RawRating>) -> Option<i32> {
    let rating = rating?;
    let value = rating.value();
    if value.is_none() {
        tracing::warn!(star_level = ?rating, "ignoring non-integral star rating");
    }
    value
}

/// Reads `main_review_id` from an undecoded record, for log context.
#[must_use]
pub fn raw_review_id(record: &Value) -> Option<String> {
    match record.get("main_review_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decodes one raw JSON record into a [`RawReview`].
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] if a field has an incompatible type
/// (e.g. `star_level` or `user_name` is an object).
pub fn decode_review(record: Value) -> Result<RawReview, ScraperError> {
    let review_id = raw_review_id(&record);
    serde_json::from_value(record).map_err(|e| ScraperError::Deserialize {
        context: format!(
            "review {}",
            review_id.as_deref().unwrap_or(UNKNOWN_REVIEW_ID)
        ),
        source: e,
    })
}

/// Flattens a [`RawReview`] and its classification into an [`EnrichedReview`].
///
/// `scrape_date` is captured once per run by the caller and stamped on every
/// row of the batch.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if `product_info` or
/// `product_info.product_id` is missing.
pub fn transform_review(
    raw: RawReview,
    enrichment: Enrichment,
    tags: &ReviewTags,
    scrape_date: NaiveDate,
) -> Result<EnrichedReview, ScraperError> {
    let review_id = raw.review_id();
    let normalization_error = |reason: &str| ScraperError::Normalization {
        review_id: review_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_REVIEW_ID.to_string()),
        reason: reason.to_string(),
    };

    let review_text = raw.text();
    let rating = normalize_rating(raw.star_level.as_ref());
    let review_date = normalize_date(raw.review_time.as_ref());
    let reply_date = normalize_date(raw.reply_time.as_ref());

    let product = raw
        .product_info
        .ok_or_else(|| normalization_error("missing product_info"))?;
    let product_id = product
        .product_id
        .as_ref()
        .ok_or_else(|| normalization_error("missing product_info.product_id"))?;

    // First CDN mirror only; an empty list is treated like a missing image.
    let product_image = product
        .img
        .and_then(|img| img.url_list)
        .and_then(|urls| urls.into_iter().next());

    Ok(EnrichedReview {
        review_id,
        order_id: raw.order_id.map(|id| id.to_string()),
        reply_date,
        review_text,
        rating,
        review_date,
        username: raw.user_name.map(RawText::into_string),
        product_name: product.product_name.map(RawText::into_string),
        product_id: format!("{}{product_id}", tags.sales_channel),
        product_image,
        sentiment: enrichment.sentiment,
        emotion: enrichment.emotion,
        sku_specification: product.sku_specification.map(RawText::into_string),
        sales_channel: tags.sales_channel.clone(),
        brand: tags.brand.clone(),
        scrape_date,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
