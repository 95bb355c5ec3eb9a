//! # Pricing Calculator
//!
//! Deterministic unit-price computation for the two product families.
//!
//! ## Pipeline
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────────────┐
//! │ SMALL FORMAT                 │     │ LARGE FORMAT                     │
//! │                              │     │                                  │
//! │ base_price                   │     │ area = w_cm × h_cm / 10 000      │
//! │   × quantity factor          │     │ base_price_per_m² × area         │
//! │      ≤100   1.00             │     │   × quantity factor              │
//! │      ≤500   0.90             │     │      ≤5   1.00                   │
//! │      ≤1000  0.80             │     │      ≤10  0.95                   │
//! │      >1000  0.70             │     │      ≤20  0.90                   │
//! │   × color factor             │     │      >20  0.85                   │
//! │      1 color 0.80, else 1.00 │     │   ─► finishing chain             │
//! │   ─► finishing chain         │     │   ─► max(price, 10.00)           │
//! └──────────────┬───────────────┘     └────────────────┬─────────────────┘
//!                └──────────────┬───────────────────────┘
//!                               ▼
//!                Money::from_decimal  (the only rounding step)
//!                               ▼
//!                total = unit × quantity   (exact, in cents)
//! ```
//!
//! Nothing here touches storage; the same code serves previews and persisted
//! quotes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::finishing::FinishingChain;
use crate::money::Money;
use crate::types::{FinishingId, PrintJob, ProductId};
use crate::validation::{validate_colors, validate_quantity};

/// Floor for a large-format unit price, applied after finishings.
pub const LARGE_FORMAT_MIN_UNIT_PRICE: Decimal = Decimal::TEN;

/// Longest side, in centimetres, a large-format job may have (100 m).
pub const MAX_DIMENSION_CM: i64 = 10_000;

// =============================================================================
// Factor Tables
// =============================================================================

/// Volume discount for small-format jobs.
pub fn small_format_quantity_factor(quantity: i64) -> Decimal {
    match quantity {
        i64::MIN..=100 => Decimal::ONE,
        101..=500 => Decimal::new(90, 2),
        501..=1000 => Decimal::new(80, 2),
        _ => Decimal::new(70, 2),
    }
}

/// Single-color jobs are 20% cheaper.
pub fn color_factor(colors: i64) -> Decimal {
    if colors == 1 {
        Decimal::new(80, 2)
    } else {
        Decimal::ONE
    }
}

/// Volume discount for large-format jobs.
pub fn large_format_quantity_factor(quantity: i64) -> Decimal {
    match quantity {
        i64::MIN..=5 => Decimal::ONE,
        6..=10 => Decimal::new(95, 2),
        11..=20 => Decimal::new(90, 2),
        _ => Decimal::new(85, 2),
    }
}

// =============================================================================
// Contract Functions
// =============================================================================

/// Small-format unit price.
///
/// ## Example
/// ```rust
/// use printwise_core::finishing::FinishingChain;
/// use printwise_core::money::Money;
/// use printwise_core::pricing::compute_small_format;
///
/// let unit = compute_small_format(Money::from_cents(1000), 600, 1, &FinishingChain::empty()).unwrap();
/// assert_eq!(unit.cents(), 640); // 10.00 × 0.80 × 0.80
/// ```
pub fn compute_small_format(
    base_price: Money,
    quantity: i64,
    colors: i64,
    finishings: &FinishingChain<'_>,
) -> CoreResult<Money> {
    validate_quantity(quantity)?;
    validate_colors(colors)?;

    let unit = base_price
        .to_decimal()
        .checked_mul(small_format_quantity_factor(quantity))
        .and_then(|unit| unit.checked_mul(color_factor(colors)))
        .and_then(|unit| finishings.apply(unit))
        .ok_or_else(|| out_of_range("unit_price"))?;

    round_unit_price(unit)
}

/// Large-format unit price.
///
/// ## Errors
/// `InvalidDimensions` when width or height is not strictly positive,
/// `OutOfRange` when a side exceeds [`MAX_DIMENSION_CM`] or the price
/// leaves the representable range.
pub fn compute_large_format(
    base_price_per_sqm: Money,
    width_cm: Decimal,
    height_cm: Decimal,
    quantity: i64,
    finishings: &FinishingChain<'_>,
) -> CoreResult<Money> {
    validate_dimensions(width_cm, height_cm)?;
    validate_quantity(quantity)?;

    let unit = width_cm
        .checked_mul(height_cm)
        .and_then(|area_cm2| area_cm2.checked_div(Decimal::new(10_000, 0)))
        .and_then(|area_sqm| base_price_per_sqm.to_decimal().checked_mul(area_sqm))
        .and_then(|unit| unit.checked_mul(large_format_quantity_factor(quantity)))
        .and_then(|unit| finishings.apply(unit))
        .ok_or_else(|| out_of_range("unit_price"))?;

    round_unit_price(unit.max(LARGE_FORMAT_MIN_UNIT_PRICE))
}

fn validate_dimensions(width_cm: Decimal, height_cm: Decimal) -> CoreResult<()> {
    if width_cm <= Decimal::ZERO || height_cm <= Decimal::ZERO {
        return Err(CoreError::InvalidDimensions {
            width: width_cm,
            height: height_cm,
        });
    }

    let max = Decimal::from(MAX_DIMENSION_CM);
    for (field, side) in [("width_cm", width_cm), ("height_cm", height_cm)] {
        if side > max {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: MAX_DIMENSION_CM,
            }
            .into());
        }
    }
    Ok(())
}

fn round_unit_price(unit: Decimal) -> CoreResult<Money> {
    Money::from_decimal(unit).ok_or_else(|| out_of_range("unit_price"))
}

fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Catalog-Resolving Entry Point
// =============================================================================

/// A pricing request as staff submit it.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct PriceRequest {
    pub product_id: ProductId,

    #[serde(flatten)]
    pub job: PrintJob,

    #[serde(default)]
    pub finishing_ids: Vec<FinishingId>,
}

/// The outcome of pricing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub unit_price: Money,
    pub total_price: Money,
    /// Finishings actually applied, ascending and duplicate-free.
    pub finishing_ids: Vec<FinishingId>,
}

/// Prices requests against a [`Catalog`].
pub struct PricingCalculator;

impl PricingCalculator {
    /// Validates, resolves and prices a request.
    ///
    /// ## Check Order
    /// ```text
    /// 1. quantity        > 0 and ≤ MAX_QUOTE_QUANTITY
    /// 2. colors          > 0                (small)
    /// 3. width, height   > 0                (large)   InvalidDimensions
    ///    width, height   ≤ MAX_DIMENSION_CM (large)   OutOfRange
    /// 4. product exists                               ProductNotFound
    /// 5. product format == job format                 InvalidFormat
    /// 6. finishings exist and fit the format          FinishingNotFound / NotAllowed
    /// ```
    pub fn price<C>(catalog: &C, request: &PriceRequest) -> CoreResult<PriceQuote>
    where
        C: Catalog + ?Sized,
    {
        let job = &request.job;
        validate_quantity(job.quantity())?;
        match job {
            PrintJob::Small { colors, .. } => validate_colors(*colors)?,
            PrintJob::Large {
                width_cm,
                height_cm,
                ..
            } => validate_dimensions(*width_cm, *height_cm)?,
        }

        let product = catalog
            .product(request.product_id)
            .ok_or(CoreError::ProductNotFound(request.product_id))?;

        if product.format != job.format() {
            return Err(ValidationError::InvalidFormat {
                field: "format".to_string(),
                reason: format!(
                    "product {} is {} format, request is {}",
                    product.id,
                    product.format,
                    job.format()
                ),
            }
            .into());
        }

        let chain = FinishingChain::resolve(catalog, &request.finishing_ids)?;
        chain.ensure_applicable(job.format())?;

        let unit_price = match *job {
            PrintJob::Small { quantity, colors } => {
                compute_small_format(product.base_price, quantity, colors, &chain)?
            }
            PrintJob::Large {
                quantity,
                width_cm,
                height_cm,
            } => compute_large_format(product.base_price, width_cm, height_cm, quantity, &chain)?,
        };

        let total_price = unit_price
            .checked_multiply_quantity(job.quantity())
            .ok_or_else(|| out_of_range("total_price"))?;

        Ok(PriceQuote {
            unit_price,
            total_price,
            finishing_ids: chain.ids(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::error::ErrorKind;
    use crate::types::{Applicability, Finishing, Product, ProductFormat};

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_product(Product {
                id: ProductId(1),
                name: "Flyer A5".to_string(),
                format: ProductFormat::Small,
                base_price: Money::from_cents(1000),
                active: true,
            })
            .with_product(Product {
                id: ProductId(2),
                name: "Vinyl banner".to_string(),
                format: ProductFormat::Large,
                base_price: Money::from_cents(500),
                active: true,
            })
            .with_finishing(Finishing {
                id: FinishingId(1),
                name: "Gloss lamination".to_string(),
                is_multiplier: true,
                price_factor: Decimal::new(15, 1),
                applicability: Applicability::Both,
                active: true,
            })
            .with_finishing(Finishing {
                id: FinishingId(2),
                name: "Rounded corners".to_string(),
                is_multiplier: false,
                price_factor: Decimal::new(200, 2),
                applicability: Applicability::Small,
                active: true,
            })
            .with_finishing(Finishing {
                id: FinishingId(3),
                name: "Eyelets".to_string(),
                is_multiplier: false,
                price_factor: Decimal::new(12, 0),
                applicability: Applicability::Large,
                active: true,
            })
    }

    fn small(product: i64, quantity: i64, colors: i64, finishings: &[i64]) -> PriceRequest {
        PriceRequest {
            product_id: ProductId(product),
            job: PrintJob::Small { quantity, colors },
            finishing_ids: finishings.iter().copied().map(FinishingId).collect(),
        }
    }

    fn large(product: i64, quantity: i64, w: i64, h: i64, finishings: &[i64]) -> PriceRequest {
        PriceRequest {
            product_id: ProductId(product),
            job: PrintJob::Large {
                quantity,
                width_cm: Decimal::from(w),
                height_cm: Decimal::from(h),
            },
            finishing_ids: finishings.iter().copied().map(FinishingId).collect(),
        }
    }

    #[test]
    fn test_small_format_quantity_boundaries() {
        let cases = [
            (100, Decimal::new(100, 2)),
            (101, Decimal::new(90, 2)),
            (500, Decimal::new(90, 2)),
            (501, Decimal::new(80, 2)),
            (1000, Decimal::new(80, 2)),
            (1001, Decimal::new(70, 2)),
        ];
        for (quantity, factor) in cases {
            assert_eq!(small_format_quantity_factor(quantity), factor, "qty {quantity}");
        }
    }

    #[test]
    fn test_color_factor() {
        assert_eq!(color_factor(1), Decimal::new(80, 2));
        for colors in [2, 3, 4, 6] {
            assert_eq!(color_factor(colors), Decimal::ONE);
        }
    }

    #[test]
    fn test_large_format_quantity_boundaries() {
        assert_eq!(large_format_quantity_factor(5), Decimal::ONE);
        assert_eq!(large_format_quantity_factor(6), Decimal::new(95, 2));
        assert_eq!(large_format_quantity_factor(10), Decimal::new(95, 2));
        assert_eq!(large_format_quantity_factor(11), Decimal::new(90, 2));
        assert_eq!(large_format_quantity_factor(20), Decimal::new(90, 2));
        assert_eq!(large_format_quantity_factor(21), Decimal::new(85, 2));
    }

    #[test]
    fn test_small_format_reference_prices() {
        let quote = PricingCalculator::price(&catalog(), &small(1, 50, 4, &[])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(1000));
        assert_eq!(quote.total_price, Money::from_cents(50_000));

        let quote = PricingCalculator::price(&catalog(), &small(1, 600, 1, &[])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(640));
        assert_eq!(quote.total_price, Money::from_cents(384_000));
    }

    #[test]
    fn test_large_format_minimum_price() {
        // 5.00/m² × 0.5 m² = 2.50, floored to 10.00
        let quote = PricingCalculator::price(&catalog(), &large(2, 3, 100, 50, &[])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(1000));
        assert_eq!(quote.total_price, Money::from_cents(3000));
    }

    #[test]
    fn test_large_format_area_and_discount() {
        // 5.00 × (300 × 200 / 10000 = 6 m²) = 30.00 × 0.95 = 28.50
        let quote = PricingCalculator::price(&catalog(), &large(2, 8, 300, 200, &[])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(2850));
    }

    #[test]
    fn test_large_format_floor_applies_after_finishings() {
        // 2.50 + 12.00 eyelets = 14.50, above the floor
        let quote = PricingCalculator::price(&catalog(), &large(2, 1, 100, 50, &[3])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(1450));
    }

    #[test]
    fn test_invalid_dimensions() {
        for (w, h) in [(0, 50), (100, 0), (-10, 50)] {
            let err = PricingCalculator::price(&catalog(), &large(2, 1, w, h, &[])).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDimensions { .. }), "{w}x{h}");
        }
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let request = PriceRequest {
            product_id: ProductId(2),
            job: PrintJob::Large {
                quantity: 1,
                width_cm: Decimal::MAX,
                height_cm: Decimal::TWO,
            },
            finishing_ids: Vec::new(),
        };
        let err = PricingCalculator::price(&catalog(), &request).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, max: MAX_DIMENSION_CM, .. })
                if field == "width_cm"
        ));

        let err = PricingCalculator::price(&catalog(), &large(2, 1, 100, MAX_DIMENSION_CM + 1, &[]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // 100 m is still a valid side
        assert!(PricingCalculator::price(&catalog(), &large(2, 1, MAX_DIMENSION_CM, 100, &[])).is_ok());
    }

    #[test]
    fn test_unrepresentable_prices_are_errors() {
        let max = Decimal::from(MAX_DIMENSION_CM);
        let err = compute_large_format(Money::from_cents(i64::MAX), max, max, 1, &FinishingChain::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "unit_price"
        ));

        let huge = CatalogSnapshot::new().with_finishing(Finishing {
            id: FinishingId(9),
            name: "Gold leaf".to_string(),
            is_multiplier: true,
            price_factor: Decimal::MAX,
            applicability: Applicability::Both,
            active: true,
        });
        let chain = FinishingChain::resolve(&huge, &[FinishingId(9)]).unwrap();
        let err = compute_small_format(Money::from_cents(1000), 10, 4, &chain).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = compute_large_format(Money::from_cents(500), max, max, 1, &chain).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_finishing_order_is_canonical() {
        // 10.00 × 1.5 + 2.00 = 17.00 regardless of caller order
        let a = PricingCalculator::price(&catalog(), &small(1, 10, 4, &[1, 2])).unwrap();
        let b = PricingCalculator::price(&catalog(), &small(1, 10, 4, &[2, 1])).unwrap();
        assert_eq!(a.unit_price, Money::from_cents(1700));
        assert_eq!(a, b);
        assert_eq!(a.finishing_ids, vec![FinishingId(1), FinishingId(2)]);
    }

    #[test]
    fn test_rounding_is_final_step_only() {
        // 10.00 × 0.90 × 0.80 × 1.5 = 10.80 exactly; intermediate rounding is never visible
        let quote = PricingCalculator::price(&catalog(), &small(1, 200, 1, &[1])).unwrap();
        assert_eq!(quote.unit_price, Money::from_cents(1080));
    }

    #[test]
    fn test_unknown_product() {
        let err = PricingCalculator::price(&catalog(), &small(99, 10, 4, &[])).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(ProductId(99))));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unknown_finishing() {
        let err = PricingCalculator::price(&catalog(), &small(1, 10, 4, &[1, 42])).unwrap_err();
        assert!(matches!(err, CoreError::FinishingNotFound(FinishingId(42))));
    }

    #[test]
    fn test_format_mismatch() {
        let err = PricingCalculator::price(&catalog(), &large(1, 1, 100, 100, &[])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_finishing_not_applicable_to_format() {
        let err = PricingCalculator::price(&catalog(), &small(1, 10, 4, &[3])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_input_checks_run_before_lookups() {
        let err = PricingCalculator::price(&catalog(), &small(99, 0, 4, &[])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));

        let err = PricingCalculator::price(&catalog(), &small(99, 10, 0, &[])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));

        let err = PricingCalculator::price(&catalog(), &large(99, 1, 0, 10, &[])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_quantity_cap() {
        let err = PricingCalculator::price(
            &catalog(),
            &small(1, crate::MAX_QUOTE_QUANTITY + 1, 4, &[]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_price_request_from_json() {
        let request: PriceRequest = serde_json::from_str(
            r#"{"product_id":2,"format":"large","quantity":3,"width_cm":100,"height_cm":50,"finishing_ids":[3]}"#,
        )
        .unwrap();
        assert_eq!(request.product_id, ProductId(2));
        assert_eq!(request.finishing_ids, vec![FinishingId(3)]);
        assert_eq!(request.job.quantity(), 3);
    }
}
