//! Database operations for the `product_reviews` table.

use std::future::Future;

use reviewdb_core::EnrichedReview;
use sqlx::PgPool;

use crate::DbError;

/// Destination for enriched review batches.
///
/// Implemented for [`PgPool`]; the pipeline only depends on this trait so
/// tests can observe (or forbid) writes.
pub trait ReviewSink {
    /// Idempotently create the review table.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Append every row in one call and return the number of rows written.
    fn append_batch(
        &self,
        rows: &[EnrichedReview],
    ) -> impl Future<Output = Result<u64, DbError>> + Send;
}

impl ReviewSink for PgPool {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        let applied = crate::ensure_schema(self).await?;
        tracing::info!(applied, "database and table setup complete");
        Ok(())
    }

    async fn append_batch(&self, rows: &[EnrichedReview]) -> Result<u64, DbError> {
        append_reviews(self, rows).await
    }
}

/// Append enriched reviews to `product_reviews`.
///
/// All inserts run inside a single transaction; if any insert fails the whole
/// batch is rolled back. Rows are never upserted: re-running the pipeline
/// appends a fresh dated snapshot. An empty slice returns `0` without
/// touching the database.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn append_reviews(pool: &PgPool, rows: &[EnrichedReview]) -> Result<u64, DbError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for row in rows {
        let result = sqlx::query(
            "INSERT INTO product_reviews \
                 (reviewid, order_id, reply_date, review_text, rating, review_date, username, \
                  product_name, product_id, product_image, sentiment_label, sentiment_score, \
                  emotion_label, emotion_score, sku_specification, sales_channel, brand, scrape_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(&row.review_id)
        .bind(&row.order_id)
        .bind(row.reply_date)
        .bind(&row.review_text)
        .bind(row.rating)
        .bind(row.review_date)
        .bind(&row.username)
        .bind(&row.product_name)
        .bind(&row.product_id)
        .bind(&row.product_image)
        .bind(&row.sentiment.label)
        .bind(row.sentiment.score)
        .bind(&row.emotion.label)
        .bind(row.emotion.score)
        .bind(&row.sku_specification)
        .bind(&row.sales_channel)
        .bind(&row.brand)
        .bind(row.scrape_date)
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
