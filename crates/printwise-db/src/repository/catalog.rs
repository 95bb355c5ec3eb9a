//! # Catalog Repository
//!
//! Clients, products and finishings. These belong to the catalog
//! collaborator: the quoting workflow only reads them. The insert methods
//! exist for the seed binary and tests.

use printwise_core::{
    Applicability, CatalogSnapshot, Client, ClientId, Finishing, FinishingId, Money, Product,
    ProductFormat, ProductId, QuoteId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::decimal_column;
use crate::error::DbResult;

const FINISHING_COLUMNS: &str = "id, name, is_multiplier, price_factor, applicability, active";

/// Repository for catalog records.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Transactional reads
    // -------------------------------------------------------------------------

    /// Checks whether a client exists.
    pub async fn client_exists(conn: &mut SqliteConnection, id: ClientId) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }

    /// Loads the product and finishings one pricing request refers to.
    ///
    /// Ids that do not exist are simply absent from the snapshot; the
    /// pricing calculator reports them as not found.
    pub async fn snapshot(
        conn: &mut SqliteConnection,
        product_id: ProductId,
        finishing_ids: &[FinishingId],
    ) -> DbResult<CatalogSnapshot> {
        let mut snapshot = CatalogSnapshot::new();

        let product = sqlx::query(
            "SELECT id, name, format, base_price_cents, active FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = product {
            snapshot.insert_product(product_from_row(&row)?);
        }

        if !finishing_ids.is_empty() {
            let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
                "SELECT {FINISHING_COLUMNS} FROM finishings WHERE id IN ("
            ));
            let mut ids = query.separated(", ");
            for id in finishing_ids {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");

            for row in query.build().fetch_all(&mut *conn).await? {
                snapshot.insert_finishing(finishing_from_row(&row)?);
            }
        }

        debug!(
            product_id = %product_id,
            finishings = finishing_ids.len(),
            "Loaded catalog snapshot"
        );

        Ok(snapshot)
    }

    /// Finishings attached to a quote, in application order.
    pub async fn finishings_for_quote(
        conn: &mut SqliteConnection,
        quote_id: QuoteId,
    ) -> DbResult<Vec<Finishing>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.name, f.is_multiplier, f.price_factor, f.applicability, f.active
            FROM quote_finishings qf
            JOIN finishings f ON f.id = qf.finishing_id
            WHERE qf.quote_id = ?1
            ORDER BY f.id ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(finishing_from_row).collect()
    }

    /// Product and client names for a quote, in that order.
    pub async fn names_for_quote(
        conn: &mut SqliteConnection,
        quote_id: QuoteId,
    ) -> DbResult<Option<(String, String)>> {
        let row = sqlx::query(
            r#"
            SELECT p.name AS product_name, c.name AS client_name
            FROM quotes q
            JOIN products p ON p.id = q.product_id
            JOIN clients c ON c.id = q.client_id
            WHERE q.id = ?1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(Some((row.try_get("product_name")?, row.try_get("client_name")?))),
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Standalone reads
    // -------------------------------------------------------------------------

    /// Active finishings usable on `format` (its own and `both`), by id.
    pub async fn finishings_for_format(&self, format: ProductFormat) -> DbResult<Vec<Finishing>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {FINISHING_COLUMNS}
            FROM finishings
            WHERE active = 1 AND applicability IN (?1, 'both')
            ORDER BY id ASC
            "#
        ))
        .bind(format)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(finishing_from_row).collect()
    }

    // -------------------------------------------------------------------------
    // Inserts (seed data, tests)
    // -------------------------------------------------------------------------

    /// Inserts or replaces a client by id.
    pub async fn upsert_client(&self, client: &Client) -> DbResult<()> {
        sqlx::query("INSERT OR REPLACE INTO clients (id, name, email) VALUES (?1, ?2, ?3)")
            .bind(client.id)
            .bind(&client.name)
            .bind(&client.email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Inserts or replaces a product by id.
    pub async fn upsert_product(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO products (id, name, format, base_price_cents, active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.format)
        .bind(product.base_price.cents())
        .bind(product.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts or replaces a finishing by id.
    pub async fn upsert_finishing(&self, finishing: &Finishing) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO finishings
                (id, name, is_multiplier, price_factor, applicability, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(finishing.id)
        .bind(&finishing.name)
        .bind(finishing.is_multiplier)
        .bind(finishing.price_factor.to_string())
        .bind(finishing.applicability)
        .bind(finishing.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

pub(crate) fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        format: row.try_get("format")?,
        base_price: Money::from_cents(row.try_get("base_price_cents")?),
        active: row.try_get("active")?,
    })
}

pub(crate) fn finishing_from_row(row: &SqliteRow) -> DbResult<Finishing> {
    let applicability: Applicability = row.try_get("applicability")?;

    Ok(Finishing {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        is_multiplier: row.try_get("is_multiplier")?,
        price_factor: decimal_column(row, "price_factor")?,
        applicability,
        active: row.try_get("active")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use printwise_core::Catalog;
    use rust_decimal::Decimal;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        catalog
            .upsert_product(&Product {
                id: ProductId(1),
                name: "Flyer A5".to_string(),
                format: ProductFormat::Small,
                base_price: Money::from_cents(1000),
                active: true,
            })
            .await
            .unwrap();

        for (id, applicability, active) in [
            (1, Applicability::Both, true),
            (2, Applicability::Small, true),
            (3, Applicability::Large, true),
            (4, Applicability::Small, false),
        ] {
            catalog
                .upsert_finishing(&Finishing {
                    id: FinishingId(id),
                    name: format!("finishing-{id}"),
                    is_multiplier: id % 2 == 1,
                    price_factor: Decimal::new(125, 2),
                    applicability,
                    active,
                })
                .await
                .unwrap();
        }

        db
    }

    #[tokio::test]
    async fn test_snapshot_contains_requested_records() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let snapshot = CatalogRepository::snapshot(
            &mut conn,
            ProductId(1),
            &[FinishingId(3), FinishingId(1), FinishingId(99)],
        )
        .await
        .unwrap();

        assert_eq!(snapshot.product(ProductId(1)).unwrap().base_price.cents(), 1000);
        assert!(snapshot.finishing(FinishingId(1)).is_some());
        assert!(snapshot.finishing(FinishingId(3)).is_some());
        assert!(snapshot.finishing(FinishingId(2)).is_none());
        assert!(snapshot.finishing(FinishingId(99)).is_none());
    }

    #[tokio::test]
    async fn test_price_factor_round_trips_exactly() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let snapshot = CatalogRepository::snapshot(&mut conn, ProductId(1), &[FinishingId(1)])
            .await
            .unwrap();

        assert_eq!(
            snapshot.finishing(FinishingId(1)).unwrap().price_factor,
            Decimal::new(125, 2)
        );
    }

    #[tokio::test]
    async fn test_finishings_for_format() {
        let db = seeded().await;

        let small: Vec<i64> = db
            .catalog()
            .finishings_for_format(ProductFormat::Small)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id.0)
            .collect();
        // 4 is small but inactive
        assert_eq!(small, vec![1, 2]);

        let large: Vec<i64> = db
            .catalog()
            .finishings_for_format(ProductFormat::Large)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id.0)
            .collect();
        assert_eq!(large, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_client_exists() {
        let db = seeded().await;
        db.catalog()
            .upsert_client(&Client {
                id: ClientId(5),
                name: "Acme".to_string(),
                email: None,
            })
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(CatalogRepository::client_exists(&mut conn, ClientId(5)).await.unwrap());
        assert!(!CatalogRepository::client_exists(&mut conn, ClientId(6)).await.unwrap());
    }

    #[tokio::test]
    async fn test_names_for_missing_quote() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let names = CatalogRepository::names_for_quote(&mut conn, QuoteId(404)).await.unwrap();
        assert!(names.is_none());
    }
}
