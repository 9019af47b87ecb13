//! HTTP client for the marketplace seller review list endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use reviewdb_core::SessionContext;
use serde::Serialize;
use serde_json::Value;

use crate::error::ScraperError;

/// Reviews requested per call. Only the first page is ever fetched.
pub const REVIEW_PAGE_SIZE: u32 = 100;

const FIRST_PAGE: u32 = 1;

/// Browser fingerprint query parameters sent with every request.
///
/// Seller id and anti-bot tokens are session-specific and come from
/// [`SessionContext::query`] instead. A session value overrides a fixed one
/// with the same key.
const FINGERPRINT_PARAMS: &[(&str, &str)] = &[
    ("locale", "id-ID"),
    ("language", "id"),
    ("aid", "4068"),
    ("app_name", "i18n_ecom_shop"),
    ("device_platform", "web"),
    ("cookie_enabled", "true"),
    ("screen_width", "1494"),
    ("screen_height", "934"),
    ("browser_language", "en-US"),
    ("browser_platform", "Win32"),
    ("browser_name", "Mozilla"),
    (
        "browser_version",
        "5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36",
    ),
    ("browser_online", "true"),
    ("timezone_name", "Asia/Jakarta"),
];

#[derive(Serialize)]
struct PageRequest {
    page: u32,
    size: u32,
}

/// Client for the seller review list endpoint.
///
/// Issues a single `POST` per run. Failures are not retried; the session
/// context is forwarded as-is and never refreshed.
pub struct ReviewClient {
    client: Client,
    endpoint: Url,
}

impl ReviewClient {
    /// Creates a client for the given review list endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidEndpoint`] if `endpoint` is not a valid
    /// URL, or [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ScraperError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Fetches the first page of reviews, swallowing every failure.
    ///
    /// Transport errors, non-2xx statuses, and undecodable bodies are logged
    /// and yield an empty vec, so the caller only has to decide what an empty
    /// fetch means for the run.
    pub async fn fetch_reviews(&self, session: &SessionContext) -> Vec<Value> {
        tracing::info!(
            page = FIRST_PAGE,
            size = REVIEW_PAGE_SIZE,
            "fetching reviews from marketplace API"
        );
        match self
            .fetch_page(session, FIRST_PAGE, REVIEW_PAGE_SIZE)
            .await
        {
            Ok(reviews) => {
                tracing::info!(count = reviews.len(), "fetched reviews");
                reviews
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching reviews from API");
                Vec::new()
            }
        }
    }

    /// Fetches one page of raw review records.
    ///
    /// Each record is returned as raw JSON so that one malformed review can be
    /// dropped later without losing the rest of the page. A body without
    /// `data.list` is an empty page, not an error.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network or TLS failure.
    /// - [`ScraperError::UnexpectedStatus`] on any non-2xx status.
    /// - [`ScraperError::Deserialize`] if the body is not JSON.
    pub async fn fetch_page(
        &self,
        session: &SessionContext,
        page: u32,
        size: u32,
    ) -> Result<Vec<Value>, ScraperError> {
        let url = self.page_url(session);

        let response = self
            .client
            .post(url)
            .headers(session_headers(session))
            .json(&PageRequest { page, size })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: Value = serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("review list page {page}"),
            source: e,
        })?;

        Ok(extract_review_list(parsed))
    }

    /// Builds the request URL: fingerprint params first, then session params.
    fn page_url(&self, session: &SessionContext) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in FINGERPRINT_PARAMS {
                if !session.query.contains_key(*key) {
                    pairs.append_pair(key, value);
                }
            }
            for (key, value) in &session.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Converts the session headers and cookies into a `HeaderMap`.
///
/// Entries that are not valid HTTP header names or values are skipped with a
/// warning rather than failing the request.
fn session_headers(session: &SessionContext) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &session.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "skipping invalid session header"),
        }
    }

    if let Some(cookie) = session.cookie_header() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(reqwest::header::COOKIE, value);
            }
            Err(_) => tracing::warn!("skipping session cookies: not a valid header value"),
        }
    }

    headers
}

/// Pulls `data.list` out of a decoded response body.
fn extract_review_list(mut body: Value) -> Vec<Value> {
    match body.pointer_mut("/data/list").map(Value::take) {
        Some(Value::Array(list)) => list,
        Some(other) => {
            tracing::warn!(kind = %json_kind(&other), "data.list is not an array; treating as empty");
            Vec::new()
        }
        None => {
            tracing::warn!("response has no data.list; treating as empty");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
