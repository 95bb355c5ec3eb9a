//! # Finishing Modifier Chain
//!
//! Applies finishing effects to a running unit price.
//!
//! ## Application Order
//! ```text
//! caller ids:  [7, 2, 7, 5]
//!                  │
//!                  ▼  sort ascending, collapse duplicates
//! chain:       [2, 5, 7]
//!                  │
//!                  ▼
//! price ─► f2 ─► f5 ─► f7 ─► price'
//!
//! is_multiplier  ⇒ price × price_factor
//! otherwise      ⇒ price + price_factor
//! ```
//!
//! Multiplication and addition do not commute, so the order is part of the
//! observable contract. It depends on the finishing ids only, never on the
//! order a caller listed them in.

use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Finishing, FinishingId, ProductFormat};

// =============================================================================
// Finishing Effect
// =============================================================================

/// What a single finishing does to the unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishingEffect {
    Multiply(Decimal),
    Add(Decimal),
}

impl FinishingEffect {
    /// Applies the effect, `None` when the result leaves `Decimal` range.
    #[inline]
    pub fn apply(self, price: Decimal) -> Option<Decimal> {
        match self {
            FinishingEffect::Multiply(factor) => price.checked_mul(factor),
            FinishingEffect::Add(amount) => price.checked_add(amount),
        }
    }
}

impl Finishing {
    pub fn effect(&self) -> FinishingEffect {
        if self.is_multiplier {
            FinishingEffect::Multiply(self.price_factor)
        } else {
            FinishingEffect::Add(self.price_factor)
        }
    }
}

/// Ascending, duplicate-free order of finishing ids.
pub fn canonical_order(ids: &[FinishingId]) -> Vec<FinishingId> {
    let mut ordered = ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

// =============================================================================
// Finishing Chain
// =============================================================================

/// Resolved finishings in application order.
#[derive(Debug, Clone, Default)]
pub struct FinishingChain<'a> {
    steps: Vec<&'a Finishing>,
}

impl<'a> FinishingChain<'a> {
    /// An empty chain, leaving the price untouched.
    pub fn empty() -> Self {
        FinishingChain { steps: Vec::new() }
    }

    /// Resolves `ids` against the catalog in canonical order.
    ///
    /// ## Errors
    /// `FinishingNotFound` for the first (lowest) id that does not resolve.
    pub fn resolve<C>(catalog: &'a C, ids: &[FinishingId]) -> CoreResult<Self>
    where
        C: Catalog + ?Sized,
    {
        let steps = canonical_order(ids)
            .into_iter()
            .map(|id| catalog.finishing(id).ok_or(CoreError::FinishingNotFound(id)))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(FinishingChain { steps })
    }

    /// Fails if any finishing in the chain cannot be used on `format`.
    pub fn ensure_applicable(&self, format: ProductFormat) -> Result<(), ValidationError> {
        if self.steps.iter().all(|f| f.applicability.allows(format)) {
            return Ok(());
        }

        Err(ValidationError::NotAllowed {
            field: "finishing_ids".to_string(),
            allowed: self
                .steps
                .iter()
                .filter(|f| f.applicability.allows(format))
                .map(|f| f.id.to_string())
                .collect(),
        })
    }

    /// Runs `price` through every effect in order, `None` on overflow.
    pub fn apply(&self, price: Decimal) -> Option<Decimal> {
        self.steps
            .iter()
            .try_fold(price, |running, finishing| finishing.effect().apply(running))
    }

    /// Ids in the order they were applied.
    pub fn ids(&self) -> Vec<FinishingId> {
        self.steps.iter().map(|f| f.id).collect()
    }

    pub fn finishings(&self) -> impl Iterator<Item = &'a Finishing> + '_ {
        self.steps.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::types::Applicability;

    fn finishing(id: i64, is_multiplier: bool, factor: Decimal, applicability: Applicability) -> Finishing {
        Finishing {
            id: FinishingId(id),
            name: format!("finishing-{id}"),
            is_multiplier,
            price_factor: factor,
            applicability,
            active: true,
        }
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new()
            // ×1.5
            .with_finishing(finishing(1, true, Decimal::new(15, 1), Applicability::Both))
            // +2.00
            .with_finishing(finishing(2, false, Decimal::new(200, 2), Applicability::Both))
            // large only, +5.00
            .with_finishing(finishing(3, false, Decimal::new(5, 0), Applicability::Large))
    }

    #[test]
    fn test_canonical_order() {
        let ids = [FinishingId(7), FinishingId(2), FinishingId(7), FinishingId(5)];
        assert_eq!(
            canonical_order(&ids),
            vec![FinishingId(2), FinishingId(5), FinishingId(7)]
        );
    }

    #[test]
    fn test_order_independent_of_caller_order() {
        let catalog = catalog();
        let forward = FinishingChain::resolve(&catalog, &[FinishingId(1), FinishingId(2)]).unwrap();
        let reverse = FinishingChain::resolve(&catalog, &[FinishingId(2), FinishingId(1)]).unwrap();

        // 10 × 1.5 + 2 = 17, never (10 + 2) × 1.5 = 18
        assert_eq!(forward.apply(Decimal::TEN), Some(Decimal::new(17, 0)));
        assert_eq!(reverse.apply(Decimal::TEN), Some(Decimal::new(17, 0)));
        assert_eq!(forward.ids(), reverse.ids());
    }

    #[test]
    fn test_duplicates_apply_once() {
        let catalog = catalog();
        let chain =
            FinishingChain::resolve(&catalog, &[FinishingId(2), FinishingId(2)]).unwrap();
        assert_eq!(chain.apply(Decimal::TEN), Some(Decimal::new(12, 0)));
        assert_eq!(chain.ids(), vec![FinishingId(2)]);
    }

    #[test]
    fn test_unknown_finishing() {
        let catalog = catalog();
        let err = FinishingChain::resolve(&catalog, &[FinishingId(1), FinishingId(99)]).unwrap_err();
        assert!(matches!(err, CoreError::FinishingNotFound(FinishingId(99))));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        assert_eq!(FinishingChain::empty().apply(Decimal::TEN), Some(Decimal::TEN));
        assert!(FinishingChain::resolve(&catalog(), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_overflow_is_none() {
        let catalog = catalog();
        let chain = FinishingChain::resolve(&catalog, &[FinishingId(1), FinishingId(2)]).unwrap();
        assert_eq!(chain.apply(Decimal::MAX), None);
        assert_eq!(FinishingEffect::Add(Decimal::ONE).apply(Decimal::MAX), None);
        assert_eq!(
            FinishingEffect::Multiply(Decimal::new(15, 1)).apply(Decimal::MAX),
            None
        );
    }

    #[test]
    fn test_applicability() {
        let catalog = catalog();
        let chain = FinishingChain::resolve(&catalog, &[FinishingId(3), FinishingId(1)]).unwrap();
        assert!(chain.ensure_applicable(ProductFormat::Large).is_ok());

        let err = chain.ensure_applicable(ProductFormat::Small).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "finishing_ids"));
    }
}
