//! # Quote Repository
//!
//! Database operations for quotes and their finishing associations.
//!
//! ## Status Writes Are Compare-And-Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE quotes SET status = :to ... WHERE id = :id AND status = :from   │
//! │                                                                         │
//! │  rows_affected == 1  ──► this caller won the transition                 │
//! │  rows_affected == 0  ──► someone else moved the quote first            │
//! │                          (service re-reads and reports the real state)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same guard protects revisions (`status = 'pending'`) and deletes
//! (`status IN ('pending', 'rejected')`).

use chrono::{DateTime, Utc};
use printwise_core::{
    CapabilityToken, ClientId, FinishingId, Money, PrintJob, ProductFormat, ProductId, Quote,
    QuoteId, QuoteStatus,
};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::optional_decimal_column;
use crate::error::{DbError, DbResult};

const QUOTE_COLUMNS: &str = r#"
    id, client_id, product_id, title, description,
    format, quantity, colors, width_cm, height_cm,
    unit_price_cents, total_price_cents, status,
    hash, token_expires_at, reject_reason, created_at, updated_at
"#;

/// Everything needed to write a priced quote (new or revised).
#[derive(Debug, Clone)]
pub struct QuoteRecord<'a> {
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub job: &'a PrintJob,
    pub unit_price: Money,
    pub total_price: Money,
}

/// Splits a job into its nullable per-format columns.
fn job_columns(job: &PrintJob) -> (ProductFormat, i64, Option<i64>, Option<String>, Option<String>) {
    match job {
        PrintJob::Small { quantity, colors } => {
            (ProductFormat::Small, *quantity, Some(*colors), None, None)
        }
        PrintJob::Large {
            quantity,
            width_cm,
            height_cm,
        } => (
            ProductFormat::Large,
            *quantity,
            None,
            Some(width_cm.to_string()),
            Some(height_cm.to_string()),
        ),
    }
}

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Standalone reads
    // -------------------------------------------------------------------------

    /// Lists quotes, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<QuoteStatus>) -> DbResult<Vec<Quote>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {QUOTE_COLUMNS} FROM quotes WHERE status = ?1 ORDER BY created_at DESC, id DESC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(quote_from_row).collect()
    }

    // -------------------------------------------------------------------------
    // Transactional reads
    // -------------------------------------------------------------------------

    pub async fn find(conn: &mut SqliteConnection, id: QuoteId) -> DbResult<Option<Quote>> {
        let row = sqlx::query(&format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(quote_from_row).transpose()
    }

    /// Looks a quote up by the SHA-256 digest of its token.
    ///
    /// The caller still has to compare the stored token in constant time.
    pub async fn find_by_token_digest(
        conn: &mut SqliteConnection,
        digest: &str,
    ) -> DbResult<Option<Quote>> {
        let row = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE hash_digest = ?1"
        ))
        .bind(digest)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(quote_from_row).transpose()
    }

    // -------------------------------------------------------------------------
    // Writes (always inside the caller's transaction)
    // -------------------------------------------------------------------------

    /// Inserts a new pending quote and returns its id.
    pub async fn insert(
        conn: &mut SqliteConnection,
        record: &QuoteRecord<'_>,
        token: &CapabilityToken,
        token_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DbResult<QuoteId> {
        let (format, quantity, colors, width_cm, height_cm) = job_columns(record.job);

        let result = sqlx::query(
            r#"
            INSERT INTO quotes (
                client_id, product_id, title, description,
                format, quantity, colors, width_cm, height_cm,
                unit_price_cents, total_price_cents, status,
                hash, hash_digest, token_expires_at,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15,
                ?16, ?16
            )
            "#,
        )
        .bind(record.client_id)
        .bind(record.product_id)
        .bind(record.title)
        .bind(record.description)
        .bind(format)
        .bind(quantity)
        .bind(colors)
        .bind(width_cm)
        .bind(height_cm)
        .bind(record.unit_price.cents())
        .bind(record.total_price.cents())
        .bind(QuoteStatus::Pending)
        .bind(token.as_str())
        .bind(token.digest())
        .bind(token_expires_at)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let id = QuoteId(result.last_insert_rowid());
        debug!(quote_id = %id, "Inserted quote");

        Ok(id)
    }

    /// Rewrites a pending quote's parameters and prices.
    ///
    /// ## Returns
    /// `false` if the quote was not pending any more.
    pub async fn revise(
        conn: &mut SqliteConnection,
        id: QuoteId,
        record: &QuoteRecord<'_>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let (format, quantity, colors, width_cm, height_cm) = job_columns(record.job);

        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                client_id = ?2,
                product_id = ?3,
                title = ?4,
                description = ?5,
                format = ?6,
                quantity = ?7,
                colors = ?8,
                width_cm = ?9,
                height_cm = ?10,
                unit_price_cents = ?11,
                total_price_cents = ?12,
                updated_at = ?13
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(record.client_id)
        .bind(record.product_id)
        .bind(record.title)
        .bind(record.description)
        .bind(format)
        .bind(quantity)
        .bind(colors)
        .bind(width_cm)
        .bind(height_cm)
        .bind(record.unit_price.cents())
        .bind(record.total_price.cents())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Replaces the finishing associations of a quote.
    pub async fn replace_finishings(
        conn: &mut SqliteConnection,
        id: QuoteId,
        finishing_ids: &[FinishingId],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM quote_finishings WHERE quote_id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        for finishing_id in finishing_ids {
            sqlx::query("INSERT INTO quote_finishings (quote_id, finishing_id) VALUES (?1, ?2)")
                .bind(id)
                .bind(*finishing_id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }

    /// Moves a quote from `from` to `to`.
    ///
    /// ## Returns
    /// `false` if the quote was no longer in `from`.
    pub async fn transition(
        conn: &mut SqliteConnection,
        id: QuoteId,
        from: QuoteStatus,
        to: QuoteStatus,
        reject_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                status = ?3,
                reject_reason = COALESCE(?4, reject_reason),
                updated_at = ?5
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(reject_reason)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a pending or rejected quote and its finishing associations.
    ///
    /// ## Returns
    /// `false` if the quote was not in a deletable state.
    pub async fn delete(conn: &mut SqliteConnection, id: QuoteId) -> DbResult<bool> {
        sqlx::query(
            r#"
            DELETE FROM quote_finishings
            WHERE quote_id = (
                SELECT id FROM quotes WHERE id = ?1 AND status IN ('pending', 'rejected')
            )
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let result =
            sqlx::query("DELETE FROM quotes WHERE id = ?1 AND status IN ('pending', 'rejected')")
                .bind(id)
                .execute(&mut *conn)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

pub(crate) fn quote_from_row(row: &SqliteRow) -> DbResult<Quote> {
    let format: ProductFormat = row.try_get("format")?;
    let quantity: i64 = row.try_get("quantity")?;

    let job = match format {
        ProductFormat::Small => PrintJob::Small {
            quantity,
            colors: row
                .try_get::<Option<i64>, _>("colors")?
                .ok_or_else(|| DbError::corrupt("colors", "missing on a small format quote"))?,
        },
        ProductFormat::Large => PrintJob::Large {
            quantity,
            width_cm: required_decimal(row, "width_cm")?,
            height_cm: required_decimal(row, "height_cm")?,
        },
    };

    Ok(Quote {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        product_id: row.try_get("product_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        job,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        total_price: Money::from_cents(row.try_get("total_price_cents")?),
        status: row.try_get("status")?,
        token: CapabilityToken::from_stored(row.try_get("hash")?),
        reject_reason: row.try_get("reject_reason")?,
        token_expires_at: row.try_get("token_expires_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn required_decimal(row: &SqliteRow, column: &str) -> DbResult<Decimal> {
    optional_decimal_column(row, column)?
        .ok_or_else(|| DbError::corrupt(column, "missing on a large format quote"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use printwise_core::{Client, Product};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog()
            .upsert_client(&Client {
                id: ClientId(1),
                name: "Acme".to_string(),
                email: Some("print@acme.test".to_string()),
            })
            .await
            .unwrap();
        db.catalog()
            .upsert_product(&Product {
                id: ProductId(1),
                name: "Banner".to_string(),
                format: ProductFormat::Large,
                base_price: Money::from_cents(500),
                active: true,
            })
            .await
            .unwrap();
        db
    }

    fn banner_job() -> PrintJob {
        PrintJob::Large {
            quantity: 3,
            width_cm: Decimal::new(1005, 1),
            height_cm: Decimal::from(50),
        }
    }

    async fn insert_quote(db: &Database, job: &PrintJob) -> (QuoteId, CapabilityToken) {
        let token = CapabilityToken::issue();
        let record = QuoteRecord {
            client_id: ClientId(1),
            product_id: ProductId(1),
            title: "Shop front banner",
            description: None,
            job,
            unit_price: Money::from_cents(1000),
            total_price: Money::from_cents(1000 * job.quantity()),
        };

        let mut conn = db.pool().acquire().await.unwrap();
        let id = QuoteRepository::insert(&mut conn, &record, &token, None, Utc::now())
            .await
            .unwrap();
        (id, token)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = setup().await;
        let job = banner_job();
        let (id, token) = insert_quote(&db, &job).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let quote = QuoteRepository::find(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.job, job);
        assert_eq!(quote.total_price.cents(), 3000);
        assert!(quote.token.matches(&token));
    }

    #[tokio::test]
    async fn test_find_by_token_digest() {
        let db = setup().await;
        let job = banner_job();
        let (id, token) = insert_quote(&db, &job).await;
        let (_, other) = insert_quote(&db, &job).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let found = QuoteRepository::find_by_token_digest(&mut conn, &token.digest())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);

        let found_other = QuoteRepository::find_by_token_digest(&mut conn, &other.digest())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(found_other.id, id);

        let missing = CapabilityToken::issue();
        assert!(QuoteRepository::find_by_token_digest(&mut conn, &missing.digest())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_total_price_check_constraint() {
        let db = setup().await;
        let job = banner_job();
        let record = QuoteRecord {
            client_id: ClientId(1),
            product_id: ProductId(1),
            title: "Broken totals",
            description: None,
            job: &job,
            unit_price: Money::from_cents(1000),
            total_price: Money::from_cents(1),
        };

        let mut conn = db.pool().acquire().await.unwrap();
        let err = QuoteRepository::insert(&mut conn, &record, &CapabilityToken::issue(), None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let db = setup().await;
        let (id, _) = insert_quote(&db, &banner_job()).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let moved = QuoteRepository::transition(
            &mut conn,
            id,
            QuoteStatus::Pending,
            QuoteStatus::Approved,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(moved);

        let again = QuoteRepository::transition(
            &mut conn,
            id,
            QuoteStatus::Pending,
            QuoteStatus::Rejected,
            Some("too late"),
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(!again);

        let quote = QuoteRepository::find(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(quote.reject_reason, None);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = setup().await;
        let (first, _) = insert_quote(&db, &banner_job()).await;
        let (second, _) = insert_quote(&db, &banner_job()).await;

        let mut conn = db.pool().acquire().await.unwrap();
        QuoteRepository::transition(
            &mut conn,
            first,
            QuoteStatus::Pending,
            QuoteStatus::Rejected,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        drop(conn);

        let pending = db.quotes().list(Some(QuoteStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);

        assert_eq!(db.quotes().list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_only_pending_or_rejected() {
        let db = setup().await;
        let (id, _) = insert_quote(&db, &banner_job()).await;
        let mut conn = db.pool().acquire().await.unwrap();

        QuoteRepository::transition(
            &mut conn,
            id,
            QuoteStatus::Pending,
            QuoteStatus::Approved,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(!QuoteRepository::delete(&mut conn, id).await.unwrap());
        assert!(QuoteRepository::find(&mut conn, id).await.unwrap().is_some());
    }
}
