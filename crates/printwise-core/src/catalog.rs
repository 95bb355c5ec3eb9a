//! # Catalog Access
//!
//! The pricing calculator needs products and finishings by id and nothing
//! else. [`Catalog`] is that seam: the database layer loads a
//! [`CatalogSnapshot`] inside the request's transaction, tests build one by
//! hand.

use std::collections::HashMap;

use crate::types::{Finishing, FinishingId, Product, ProductId};

/// Read-only lookup of catalog records by id.
pub trait Catalog {
    fn product(&self, id: ProductId) -> Option<&Product>;
    fn finishing(&self, id: FinishingId) -> Option<&Finishing>;
}

/// In-memory catalog holding exactly the records one request needs.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: HashMap<ProductId, Product>,
    finishings: HashMap<FinishingId, Finishing>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.insert_product(product);
        self
    }

    pub fn with_finishing(mut self, finishing: Finishing) -> Self {
        self.insert_finishing(finishing);
        self
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn insert_finishing(&mut self, finishing: Finishing) {
        self.finishings.insert(finishing.id, finishing);
    }
}

impl Catalog for CatalogSnapshot {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    fn finishing(&self, id: FinishingId) -> Option<&Finishing> {
        self.finishings.get(&id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Applicability, ProductFormat};
    use rust_decimal::Decimal;

    #[test]
    fn test_snapshot_lookup() {
        let catalog = CatalogSnapshot::new()
            .with_product(Product {
                id: ProductId(1),
                name: "Business cards".to_string(),
                format: ProductFormat::Small,
                base_price: Money::from_cents(1000),
                active: true,
            })
            .with_finishing(Finishing {
                id: FinishingId(3),
                name: "Lamination".to_string(),
                is_multiplier: true,
                price_factor: Decimal::new(15, 1),
                applicability: Applicability::Both,
                active: true,
            });

        assert_eq!(catalog.product(ProductId(1)).unwrap().name, "Business cards");
        assert!(catalog.product(ProductId(2)).is_none());
        assert!(catalog.finishing(FinishingId(3)).is_some());
        assert!(catalog.finishing(FinishingId(1)).is_none());
    }
}
