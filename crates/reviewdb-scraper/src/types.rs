//! Marketplace review API response types for the seller review list endpoint.
//!
//! ## Observed shape
//!
//! The endpoint wraps results as `{"code": 0, "data": {"list": [...]}}`. Each
//! list entry is a review with snake_case keys. Every field is treated as
//! optional: the seller API omits keys rather than sending `null` for
//! anonymous reviewers, text-less ratings, and unanswered reviews.
//!
//! ### Ids
//! `main_review_id`, `order_id`, and `product_info.product_id` arrive as
//! decimal strings on most accounts but as JSON integers on some. [`RawId`]
//! accepts both and renders them identically.
//!
//! ### Timestamps
//! `review_time` and `reply_time` are epoch milliseconds. They are kept as raw
//! JSON so a malformed timestamp degrades to a null date instead of failing
//! the whole record (see [`crate::normalize::normalize_date`]).
//!
//! ### Scalars
//! `review_text`, `user_name`, `product_name`, and `sku_specification` are
//! strings in practice, but a bare number or bool is rendered to a string
//! rather than failing the record ([`RawText`]). `star_level` may arrive as
//! an integer, an integral float, or a numeric string ([`RawRating`]).
//! Objects and arrays in any of these fields still fail decoding, except
//! `review_text`, where they count as "no text".

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// A string-or-integer identifier from the review API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    UInt(u64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(n) => write!(f, "{n}"),
            RawId::UInt(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// A text field that tolerates numeric and boolean values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawText::Text(s) => f.write_str(s),
            RawText::Int(n) => write!(f, "{n}"),
            RawText::UInt(n) => write!(f, "{n}"),
            RawText::Float(n) => write!(f, "{n}"),
            RawText::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl RawText {
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            RawText::Text(s) => s,
            other => other.to_string(),
        }
    }
}

/// A star rating as sent by the API: `5`, `5.0`, or `"5"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRating {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawRating {
    /// The rating as an integer, if it is integral and fits in an `i32`.
    #[must_use]
    pub fn value(&self) -> Option<i32> {
        match self {
            RawRating::Int(n) => i32::try_from(*n).ok(),
            RawRating::Float(f) => integral(*f),
            RawRating::Text(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(f: f64) -> Option<i32> {
    (f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX)).then(|| f as i32)
}

/// One review entry from `data.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    #[serde(default)]
    pub main_review_id: Option<RawId>,

    #[serde(default)]
    pub order_id: Option<RawId>,

    /// Review body. Usually Indonesian free text; absent for star-only reviews.
    #[serde(default)]
    pub review_text: Option<Value>,

    /// Star rating, 1-5.
    #[serde(default)]
    pub star_level: Option<RawRating>,

    /// Review creation time in epoch milliseconds.
    #[serde(default)]
    pub review_time: Option<Value>,

    /// Seller reply time in epoch milliseconds; absent when unanswered.
    #[serde(default)]
    pub reply_time: Option<Value>,

    #[serde(default)]
    pub user_name: Option<RawText>,

    #[serde(default)]
    pub product_info: Option<RawProductInfo>,
}

impl RawReview {
    /// The review text. Numbers and bools are rendered as strings; `null`,
    /// objects, and arrays are no text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self.review_text.as_ref()? {
            Value::String(s) => Some(s.clone()),
            v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
            _ => None,
        }
    }

    /// The review id rendered as a string, if present.
    #[must_use]
    pub fn review_id(&self) -> Option<String> {
        self.main_review_id.as_ref().map(ToString::to_string)
    }
}

/// Nested product details attached to each review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductInfo {
    #[serde(default)]
    pub product_name: Option<RawText>,

    #[serde(default)]
    pub product_id: Option<RawId>,

    #[serde(default)]
    pub img: Option<RawImage>,

    /// Variant description, e.g. `"Hitam, L"`.
    #[serde(default)]
    pub sku_specification: Option<RawText>,
}

/// Product thumbnail: a list of CDN mirrors of the same image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url_list: Option<Vec<String>>,
}
