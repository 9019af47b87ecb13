use std::collections::BTreeMap;

use crate::app_config::{AppConfig, DatabaseConfig, SessionContext};
use crate::ConfigError;

const DEFAULT_REVIEW_API_URL: &str =
    "https://seller-id.tokopedia.com/api/v1/review/biz_backend/list";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u16>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_map = |var: &str| -> Result<BTreeMap<String, String>, ConfigError> {
        parse_string_map(var, &or_default(var, "{}"))
    };

    let database = DatabaseConfig {
        user: require("DB_USER")?,
        password: require("DB_PASSWORD")?,
        host: require("DB_HOST")?,
        port: parse_u16("DB_PORT", "5432")?,
        database: require("DB_DATABASE")?,
        max_connections: parse_u32("REVIEWDB_DB_MAX_CONNECTIONS", "5")?,
        min_connections: parse_u32("REVIEWDB_DB_MIN_CONNECTIONS", "1")?,
        acquire_timeout_secs: parse_u64("REVIEWDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?,
    };

    let session = SessionContext {
        cookies: parse_map("COOKIES_JSON")?,
        headers: parse_map("HEADERS_JSON")?,
        query: parse_map("QUERY_PARAMS_JSON")?,
    };

    Ok(AppConfig {
        database,
        session,
        log_level: or_default("REVIEWDB_LOG_LEVEL", "info"),
        review_api_url: or_default("REVIEWDB_REVIEW_API_URL", DEFAULT_REVIEW_API_URL),
        request_timeout_secs: parse_u64("REVIEWDB_REQUEST_TIMEOUT_SECS", "30")?,
        sentiment_url: or_default("REVIEWDB_SENTIMENT_URL", "http://localhost:8081"),
        emotion_url: or_default("REVIEWDB_EMOTION_URL", "http://localhost:8082"),
        classifier_timeout_secs: parse_u64("REVIEWDB_CLASSIFIER_TIMEOUT_SECS", "30")?,
        max_concurrent_classifications: parse_usize(
            "REVIEWDB_MAX_CONCURRENT_CLASSIFICATIONS",
            "1",
        )?
        .max(1),
        sales_channel: or_default("REVIEWDB_SALES_CHANNEL", "TiktokMall"),
        brand: or_default("REVIEWDB_BRAND", "Bodypack"),
    })
}

/// Parse a JSON object into a string map.
///
/// Non-string scalar values (numbers, booleans) are stringified; nested
/// objects, arrays, and nulls are rejected.
fn parse_string_map(var: &str, raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    let serde_json::Value::Object(object) = value else {
        return Err(invalid("expected a JSON object".to_string()));
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            serde_json::Value::Number(n) => Ok((key, n.to_string())),
            serde_json::Value::Bool(b) => Ok((key, b.to_string())),
            other => Err(invalid(format!("value for key \"{key}\" is not a scalar: {other}"))),
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
