use std::collections::BTreeMap;

/// Connection settings for the Postgres review store.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Pre-captured marketplace session: cookies, headers, and extra query
/// parameters (seller id, anti-bot tokens) passed through verbatim on the
/// review request.
///
/// Acquiring or refreshing these values happens outside this crate; they are
/// treated as an opaque, possibly short-lived credential.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub cookies: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl SessionContext {
    /// Renders the cookie map as a single `Cookie` header value
    /// (`name=value; name2=value2`). Returns `None` when there are no cookies.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only names are printed; values are credentials.
        f.debug_struct("SessionContext")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("query", &self.query.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub session: SessionContext,
    pub log_level: String,
    pub review_api_url: String,
    pub request_timeout_secs: u64,
    pub sentiment_url: String,
    pub emotion_url: String,
    pub classifier_timeout_secs: u64,
    pub max_concurrent_classifications: usize,
    pub sales_channel: String,
    pub brand: String,
}
