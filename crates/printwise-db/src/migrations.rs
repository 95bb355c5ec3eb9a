//! # Schema Migrations
//!
//! The schema ships inside the binary; `Database::new` applies whatever the
//! database has not seen yet.
//!
//! ```text
//! migrations/sqlite/
//!   001_initial_schema.sql   clients, products, finishings,
//!                            quotes, quote_finishings, waste_control
//! ```
//!
//! Applied files are never edited. Schema changes go in a new, higher
//! numbered file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

pub(crate) static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in file order. A no-op on an up-to-date schema.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}
