use std::time::Duration;

use reviewdb_core::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use thiserror::Error;

pub mod reviews;

pub use reviews::{append_reviews, ReviewSink};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Database every Postgres server has; used to create the target database.
const MAINTENANCE_DATABASE: &str = "postgres";

/// SQLSTATE `duplicate_database`.
const DUPLICATE_DATABASE: &str = "42P04";

// Path relative to crates/reviewdb-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_database_config(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout_secs: config.acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Build connect options from discrete settings. Credentials are passed
/// through as-is, so passwords containing URL metacharacters need no escaping.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

/// Create the configured database if the server does not have it yet.
///
/// Returns `true` if this call created it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the server is unreachable or the database
/// cannot be created.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<bool, DbError> {
    ensure_database_with(&connect_options(config), &config.database).await
}

/// Like [`ensure_database`], for callers that already hold connect options
/// for the server. The database named in `server` is ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the server is unreachable or the database
/// cannot be created.
pub async fn ensure_database_with(
    server: &PgConnectOptions,
    database: &str,
) -> Result<bool, DbError> {
    let options = server.clone().database(MAINTENANCE_DATABASE);
    let mut conn = PgConnection::connect_with(&options).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(database)
            .fetch_one(&mut conn)
            .await?;

    let created = if exists {
        false
    } else {
        let statement = format!("CREATE DATABASE {}", quote_identifier(database));
        match conn.execute(statement.as_str()).await {
            Ok(_) => {
                tracing::info!(database, "created database");
                true
            }
            // Another process created it between the check and the create.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(DUPLICATE_DATABASE) => {
                false
            }
            Err(e) => return Err(e.into()),
        }
    };

    conn.close().await?;
    Ok(created)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Connect to a Postgres pool using the configured database settings.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(
    database: &DatabaseConfig,
    config: PoolConfig,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect_options(database))
        .await
}

/// Create the `product_reviews` table if needed by running pending migrations.
///
/// Safe to call on every run: already-applied migrations are skipped.
/// Returns the number of migrations applied by this call.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<usize, DbError> {
    // The _sqlx_migrations table does not exist on a fresh database; treat
    // absence as zero applied.
    let applied_before = applied_migration_count(pool).await;

    MIGRATOR.run(pool).await?;

    let applied_after = applied_migration_count(pool).await;
    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migration_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}
