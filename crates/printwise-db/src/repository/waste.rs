//! # Waste Repository
//!
//! Database operations for waste control records. A record is written once
//! per quote (UNIQUE `quote_id`) and never updated.

use chrono::{DateTime, Utc};
use printwise_core::{QuoteId, WasteAssessment, WasteRecord, WasteRecordId, WasteReportEntry};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::decimal_column;
use crate::error::DbResult;

/// Repository for waste control records.
#[derive(Debug, Clone)]
pub struct WasteRepository {
    pool: SqlitePool,
}

impl WasteRepository {
    /// Creates a new WasteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WasteRepository { pool }
    }

    /// Checks whether a quote already has its waste record.
    pub async fn exists_for_quote(conn: &mut SqliteConnection, quote_id: QuoteId) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM waste_control WHERE quote_id = ?1")
                .bind(quote_id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(found.is_some())
    }

    /// Writes the record for an accepted assessment.
    pub async fn insert(
        conn: &mut SqliteConnection,
        quote_id: QuoteId,
        expected_quantity: i64,
        actual_quantity: i64,
        assessment: &WasteAssessment,
        now: DateTime<Utc>,
    ) -> DbResult<WasteRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO waste_control (
                quote_id, expected_quantity, actual_quantity,
                waste_percentage, justification, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(quote_id)
        .bind(expected_quantity)
        .bind(actual_quantity)
        .bind(assessment.waste_percentage.to_string())
        .bind(assessment.justification.as_deref())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let id = WasteRecordId(result.last_insert_rowid());
        debug!(waste_record_id = %id, quote_id = %quote_id, "Inserted waste record");

        Ok(WasteRecord {
            id,
            quote_id,
            expected_quantity,
            actual_quantity,
            waste_percentage: assessment.waste_percentage,
            justification: assessment.justification.clone(),
            created_at: now,
        })
    }

    /// Gets the waste record of a quote, if reconciled.
    pub async fn get_by_quote(&self, quote_id: QuoteId) -> DbResult<Option<WasteRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, quote_id, expected_quantity, actual_quantity,
                   waste_percentage, justification, created_at
            FROM waste_control
            WHERE quote_id = ?1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(waste_record_from_row).transpose()
    }

    /// All waste records with the quote, product and client they belong to,
    /// newest first.
    pub async fn report(&self) -> DbResult<Vec<WasteReportEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.quote_id, w.expected_quantity, w.actual_quantity,
                   w.waste_percentage, w.justification, w.created_at,
                   q.title AS quote_title,
                   p.name  AS product_name,
                   c.name  AS client_name
            FROM waste_control w
            JOIN quotes   q ON q.id = w.quote_id
            JOIN products p ON p.id = q.product_id
            JOIN clients  c ON c.id = q.client_id
            ORDER BY w.created_at DESC, w.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DbResult<WasteReportEntry> {
                Ok(WasteReportEntry {
                    record: waste_record_from_row(row)?,
                    quote_title: row.try_get("quote_title")?,
                    product_name: row.try_get("product_name")?,
                    client_name: row.try_get("client_name")?,
                })
            })
            .collect()
    }
}

fn waste_record_from_row(row: &SqliteRow) -> DbResult<WasteRecord> {
    Ok(WasteRecord {
        id: row.try_get("id")?,
        quote_id: row.try_get("quote_id")?,
        expected_quantity: row.try_get("expected_quantity")?,
        actual_quantity: row.try_get("actual_quantity")?,
        waste_percentage: decimal_column(row, "waste_percentage")?,
        justification: row.try_get("justification")?,
        created_at: row.try_get("created_at")?,
    })
}
