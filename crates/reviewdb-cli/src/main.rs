mod pipeline;

use clap::Parser;
use reviewdb_core::{DatabaseConfig, ReviewTags};
use reviewdb_db::ReviewSink;
use reviewdb_scraper::ReviewClient;
use reviewdb_sentiment::{EnrichmentClassifier, TeiClassifier, EMOTION_MODEL, SENTIMENT_MODEL};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{PersistOutcome, PipelineOptions};

#[derive(Debug, Parser)]
#[command(name = "reviewdb-cli")]
#[command(about = "Fetch marketplace reviews, classify sentiment and emotion, and append them to Postgres")]
struct Cli {
    /// Fetch and classify reviews, print them as JSON lines, and skip the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = reviewdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = if cli.dry_run {
        None
    } else {
        let Some(pool) = setup_database(&config.database).await else {
            tracing::error!("exiting due to database connection error");
            return Ok(());
        };
        Some(pool)
    };

    tracing::info!(
        sentiment = SENTIMENT_MODEL,
        emotion = EMOTION_MODEL,
        "loading sentiment and emotion classifiers"
    );
    let classifier = EnrichmentClassifier::new(
        TeiClassifier::new(
            SENTIMENT_MODEL,
            &config.sentiment_url,
            config.classifier_timeout_secs,
        )?,
        TeiClassifier::new(
            EMOTION_MODEL,
            &config.emotion_url,
            config.classifier_timeout_secs,
        )?,
    );
    let client = ReviewClient::new(&config.review_api_url, config.request_timeout_secs)?;

    let tags = ReviewTags {
        sales_channel: config.sales_channel.clone(),
        brand: config.brand.clone(),
    };
    let options = PipelineOptions {
        tags: &tags,
        max_concurrent: config.max_concurrent_classifications,
    };

    let Some(pool) = pool else {
        let reviews =
            pipeline::run_pipeline(&client, &config.session, &classifier, &options).await;
        for review in &reviews {
            println!("{}", serde_json::to_string(review)?);
        }
        println!("dry-run: {} reviews enriched; nothing written", reviews.len());
        return Ok(());
    };

    let outcome =
        pipeline::run_ingest(&pool, &client, &config.session, &classifier, &options).await;
    match outcome {
        PersistOutcome::Appended(rows) => println!("ingest complete: {rows} reviews appended"),
        PersistOutcome::Skipped => println!("ingest complete: no reviews to append"),
        PersistOutcome::Failed(e) => println!("ingest finished without writing: {e}"),
    }

    Ok(())
}

/// Create the database if needed, connect, and make sure the review table
/// exists.
///
/// Returns `None` (after logging) on any failure; the caller refuses to run
/// the pipeline without a usable store.
async fn setup_database(database: &DatabaseConfig) -> Option<sqlx::PgPool> {
    // A role without access to the maintenance database can still use an
    // existing target database, so this failure alone is not fatal.
    if let Err(e) = reviewdb_db::ensure_database(database).await {
        tracing::warn!(
            host = %database.host,
            database = %database.database,
            error = %e,
            "could not verify or create database"
        );
    }

    let pool_config = reviewdb_db::PoolConfig::from_database_config(database);
    let pool = match reviewdb_db::connect_pool(database, pool_config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(host = %database.host, error = %e, "error connecting to database");
            return None;
        }
    };

    if let Err(e) = pool.ensure_schema().await {
        tracing::error!(error = %e, "error during database setup");
        return None;
    }

    Some(pool)
}
