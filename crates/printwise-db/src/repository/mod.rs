//! # Repository Module
//!
//! Database repository implementations for PrintWise.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  Standalone reads (own pooled connection):                             │
//! │       db.quotes().list(Some(QuoteStatus::Pending))                      │
//! │       db.waste().report()                                               │
//! │                                                                         │
//! │  Transactional steps (caller's connection):                            │
//! │       let mut tx = db.begin().await?;                                   │
//! │       QuoteRepository::find(&mut tx, id)                                │
//! │       QuoteRepository::transition(&mut tx, id, from, to, ..)            │
//! │       WasteRepository::insert(&mut tx, ..)                              │
//! │       tx.commit().await?;                                               │
//! │                                                                         │
//! │  Every read that feeds a write decision goes through the transaction   │
//! │  connection, never through the pool.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Clients, products, finishings
//! - [`quote::QuoteRepository`] - Quotes and their finishing associations
//! - [`waste::WasteRepository`] - Waste control records and report

pub mod catalog;
pub mod quote;
pub mod waste;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

use crate::error::{DbError, DbResult};

/// Reads a decimal stored as TEXT.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> DbResult<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| DbError::corrupt(column, e))
}

/// Reads a nullable decimal stored as TEXT.
pub(crate) fn optional_decimal_column(row: &SqliteRow, column: &str) -> DbResult<Option<Decimal>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| Decimal::from_str(&raw).map_err(|e| DbError::corrupt(column, e)))
        .transpose()
}
