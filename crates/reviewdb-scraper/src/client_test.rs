use serde_json::json;

use super::*;

fn test_client() -> ReviewClient {
    ReviewClient::new("https://seller.example.com/api/v1/review/list", 5).unwrap()
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn new_rejects_invalid_endpoint() {
    let result = ReviewClient::new("not a url", 5);
    assert!(
        matches!(result, Err(ScraperError::InvalidEndpoint { .. })),
        "expected InvalidEndpoint"
    );
}

#[test]
fn page_url_includes_fingerprint_params() {
    let url = test_client().page_url(&SessionContext::default());
    assert_eq!(url.path(), "/api/v1/review/list");
    assert_eq!(query_value(&url, "locale").as_deref(), Some("id-ID"));
    assert_eq!(query_value(&url, "aid").as_deref(), Some("4068"));
    assert_eq!(
        query_value(&url, "timezone_name").as_deref(),
        Some("Asia/Jakarta")
    );
}

#[test]
fn page_url_appends_session_query() {
    let mut session = SessionContext::default();
    session
        .query
        .insert("msToken".to_string(), "tok==".to_string());
    let url = test_client().page_url(&session);
    assert_eq!(query_value(&url, "msToken").as_deref(), Some("tok=="));
}

#[test]
fn session_query_overrides_fingerprint_param() {
    let mut session = SessionContext::default();
    session.query.insert("locale".to_string(), "en-US".to_string());
    let url = test_client().page_url(&session);
    let locales: Vec<String> = url
        .query_pairs()
        .filter(|(k, _)| k == "locale")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(locales, vec!["en-US".to_string()]);
}

#[test]
fn session_headers_include_cookie_header() {
    let mut session = SessionContext::default();
    session.cookies.insert("sid".to_string(), "1".to_string());
    session
        .headers
        .insert("x-secsdk-csrf-token".to_string(), "abc".to_string());
    let headers = session_headers(&session);
    assert_eq!(headers.get("cookie").unwrap(), "sid=1");
    assert_eq!(headers.get("x-secsdk-csrf-token").unwrap(), "abc");
}

#[test]
fn session_headers_skip_invalid_names() {
    let mut session = SessionContext::default();
    session
        .headers
        .insert("bad header name".to_string(), "v".to_string());
    session.headers.insert("accept".to_string(), "*/*".to_string());
    let headers = session_headers(&session);
    assert_eq!(headers.len(), 1);
    assert!(headers.contains_key("accept"));
}

#[test]
fn extract_review_list_returns_list() {
    let body = json!({"code": 0, "data": {"list": [{"main_review_id": "R1"}, {}]}});
    let list = extract_review_list(body);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["main_review_id"], "R1");
}

#[test]
fn extract_review_list_missing_data_is_empty() {
    assert!(extract_review_list(json!({"code": 10001, "message": "login"})).is_empty());
}

#[test]
fn extract_review_list_missing_list_is_empty() {
    assert!(extract_review_list(json!({"data": {"total": 0}})).is_empty());
}

#[test]
fn extract_review_list_non_array_list_is_empty() {
    assert!(extract_review_list(json!({"data": {"list": null}})).is_empty());
    assert!(extract_review_list(json!({"data": "oops"})).is_empty());
}
