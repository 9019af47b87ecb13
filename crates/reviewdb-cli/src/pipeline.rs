//! Review ingestion pipeline: fetch, classify, and transform one page of
//! reviews, then append the batch to the sink.
//!
//! Each record is processed independently. A record that cannot be decoded,
//! classified, or transformed is logged and dropped; the rest of the batch
//! carries on.

use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};
use reviewdb_core::{EnrichedReview, ReviewTags, SessionContext};
use reviewdb_db::{DbError, ReviewSink};
use reviewdb_scraper::{decode_review, raw_review_id, transform_review, ReviewClient, ScraperError};
use reviewdb_sentiment::{EnrichmentClassifier, SentimentError, TextClassifier};
use serde_json::Value;
use thiserror::Error;

/// Why a single review was dropped from the batch.
#[derive(Debug, Error)]
pub(crate) enum RecordError {
    #[error(transparent)]
    Transform(#[from] ScraperError),

    #[error("classification failed: {0}")]
    Classification(#[from] SentimentError),
}

/// Result of processing one raw review record.
#[derive(Debug)]
pub(crate) enum RecordOutcome {
    Enriched(Box<EnrichedReview>),
    Failed {
        review_id: Option<String>,
        error: RecordError,
    },
}

/// Result of handing a batch to the sink.
#[derive(Debug)]
pub(crate) enum PersistOutcome {
    /// The batch was empty; the sink was not called.
    Skipped,
    Appended(u64),
    Failed(DbError),
}

/// Per-run settings shared by every record.
pub(crate) struct PipelineOptions<'a> {
    pub tags: &'a ReviewTags,
    /// Upper bound on records classified at once. `1` is fully sequential.
    pub max_concurrent: usize,
}

/// Fetch one page of reviews and enrich every record that survives.
///
/// The scrape date is captured once, after the fetch, and shared by the
/// whole batch even if processing crosses midnight.
pub(crate) async fn run_pipeline<S, E>(
    client: &ReviewClient,
    session: &SessionContext,
    classifier: &EnrichmentClassifier<S, E>,
    options: &PipelineOptions<'_>,
) -> Vec<EnrichedReview>
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    let raw = client.fetch_reviews(session).await;
    if raw.is_empty() {
        return Vec::new();
    }

    let scrape_date = Local::now().date_naive();
    enrich_reviews(raw, classifier, options, scrape_date).await
}

/// Run the pipeline and append the result to `sink`.
pub(crate) async fn run_ingest<K, S, E>(
    sink: &K,
    client: &ReviewClient,
    session: &SessionContext,
    classifier: &EnrichmentClassifier<S, E>,
    options: &PipelineOptions<'_>,
) -> PersistOutcome
where
    K: ReviewSink,
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    let reviews = run_pipeline(client, session, classifier, options).await;
    persist_batch(sink, &reviews).await
}

/// Enrich raw records, dropping failures. Survivors keep their fetch order.
pub(crate) async fn enrich_reviews<S, E>(
    raw: Vec<Value>,
    classifier: &EnrichmentClassifier<S, E>,
    options: &PipelineOptions<'_>,
    scrape_date: NaiveDate,
) -> Vec<EnrichedReview>
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    let total = raw.len();
    let outcomes = collect_outcomes(raw, classifier, options, scrape_date).await;

    let mut reviews = Vec::with_capacity(total);
    for outcome in outcomes {
        match outcome {
            RecordOutcome::Enriched(review) => reviews.push(*review),
            RecordOutcome::Failed { review_id, error } => {
                tracing::error!(
                    review_id = review_id.as_deref().unwrap_or("<unknown>"),
                    error = %error,
                    "error processing review; skipping"
                );
            }
        }
    }

    tracing::info!(
        fetched = total,
        enriched = reviews.len(),
        dropped = total - reviews.len(),
        "review batch processed"
    );
    reviews
}

/// Process every record and return one outcome per record, in input order.
///
/// `buffered` keeps output order equal to input order regardless of which
/// classification finishes first.
pub(crate) async fn collect_outcomes<S, E>(
    raw: Vec<Value>,
    classifier: &EnrichmentClassifier<S, E>,
    options: &PipelineOptions<'_>,
    scrape_date: NaiveDate,
) -> Vec<RecordOutcome>
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    stream::iter(raw)
        .map(|record| process_record(record, classifier, options.tags, scrape_date))
        .buffered(options.max_concurrent.max(1))
        .collect()
        .await
}

async fn process_record<S, E>(
    record: Value,
    classifier: &EnrichmentClassifier<S, E>,
    tags: &ReviewTags,
    scrape_date: NaiveDate,
) -> RecordOutcome
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    let review_id = raw_review_id(&record);
    match enrich_record(record, classifier, tags, scrape_date).await {
        Ok(review) => RecordOutcome::Enriched(Box::new(review)),
        Err(error) => RecordOutcome::Failed { review_id, error },
    }
}

async fn enrich_record<S, E>(
    record: Value,
    classifier: &EnrichmentClassifier<S, E>,
    tags: &ReviewTags,
    scrape_date: NaiveDate,
) -> Result<EnrichedReview, RecordError>
where
    S: TextClassifier + Sync,
    E: TextClassifier + Sync,
{
    let raw = decode_review(record)?;
    let review_id = raw.review_id();
    let text = raw.text();
    let enrichment = classifier
        .enrich(review_id.as_deref(), text.as_deref())
        .await?;
    Ok(transform_review(raw, enrichment, tags, scrape_date)?)
}

/// Append a batch in a single sink call.
///
/// An empty batch is never sent to the sink. Append failures are logged and
/// not retried.
pub(crate) async fn persist_batch<K: ReviewSink>(
    sink: &K,
    rows: &[EnrichedReview],
) -> PersistOutcome {
    if rows.is_empty() {
        tracing::info!("no data to append; exiting");
        return PersistOutcome::Skipped;
    }

    tracing::info!(rows = rows.len(), "appending data to the database");
    match sink.append_batch(rows).await {
        Ok(appended) => {
            tracing::info!(rows = appended, "data appended successfully");
            PersistOutcome::Appended(appended)
        }
        Err(e) => {
            tracing::error!(error = %e, "error appending data to database");
            PersistOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
