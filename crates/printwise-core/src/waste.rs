//! # Waste Reconciliation
//!
//! Decides whether a production run may close its quote.
//!
//! ## Decision Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. expected > 0, actual ≥ 0             else ValidationError           │
//! │  2. no waste record yet for the quote    else ValidationError::Duplicate│
//! │  3. quote is approved                    else InvalidStateTransition    │
//! │  4. waste% = round((expected - actual) × 100 / expected, 2), min 0      │
//! │  5. waste% > threshold and no justification                             │
//! │                                          ──► JustificationRequired      │
//! │  6. ok: caller persists record + completes quote in ONE transaction     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The duplicate check comes before the status check: after a successful
//! reconciliation the quote is `completed`, and a retry should say
//! "already reconciled", not "wrong state".

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::lifecycle::{QuoteAction, QuoteStatus};
use crate::types::QuoteId;
use crate::validation::{normalize_optional_text, validate_waste_quantities};
use crate::DEFAULT_WASTE_THRESHOLD_PERCENT;

/// Waste percentage, rounded half away from zero to 2 decimal places.
///
/// Overproduction (`actual ≥ expected`) is 0% waste.
///
/// ## Example
/// ```rust
/// use printwise_core::waste::waste_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(waste_percentage(100, 90), Decimal::new(1000, 2));
/// assert_eq!(waste_percentage(3, 2), Decimal::new(3333, 2));
/// assert_eq!(waste_percentage(100, 120), Decimal::ZERO);
/// ```
pub fn waste_percentage(expected: i64, actual: i64) -> Decimal {
    let waste = expected.saturating_sub(actual);
    if waste <= 0 || expected <= 0 {
        return Decimal::new(0, 2);
    }

    let mut pct = (Decimal::from(waste) * Decimal::ONE_HUNDRED / Decimal::from(expected))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(2);
    pct
}

/// Staff input for reconciling one quote.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct WasteInput {
    pub quote_id: QuoteId,
    pub expected_quantity: i64,
    pub actual_quantity: i64,
    #[serde(default)]
    pub justification: Option<String>,
}

/// A reconciliation that passed every check and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteAssessment {
    pub waste_percentage: Decimal,
    pub justification_required: bool,
    /// Trimmed justification, kept even when not required.
    pub justification: Option<String>,
    /// Status the quote moves to.
    pub next_status: QuoteStatus,
}

// =============================================================================
// Waste Policy
// =============================================================================

/// The configured waste threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WastePolicy {
    threshold: Decimal,
}

impl Default for WastePolicy {
    fn default() -> Self {
        WastePolicy {
            threshold: Decimal::from(DEFAULT_WASTE_THRESHOLD_PERCENT),
        }
    }
}

impl WastePolicy {
    pub fn new(threshold: Decimal) -> Self {
        WastePolicy { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Strictly above the threshold: exactly 5.00% at a 5% threshold passes.
    pub fn requires_justification(&self, waste_percentage: Decimal) -> bool {
        waste_percentage > self.threshold
    }

    /// Runs the full decision for one quote.
    ///
    /// `status` and `already_reconciled` must be read in the same transaction
    /// that will persist the result.
    pub fn reconcile(
        &self,
        input: &WasteInput,
        status: QuoteStatus,
        already_reconciled: bool,
    ) -> CoreResult<WasteAssessment> {
        validate_waste_quantities(input.expected_quantity, input.actual_quantity)?;

        if already_reconciled {
            return Err(ValidationError::Duplicate {
                field: "waste record for quote".to_string(),
                value: input.quote_id.to_string(),
            }
            .into());
        }

        let next_status = status.apply(QuoteAction::Complete)?;

        let waste_percentage = waste_percentage(input.expected_quantity, input.actual_quantity);
        let justification_required = self.requires_justification(waste_percentage);
        let justification = normalize_optional_text("justification", input.justification.as_deref())?;

        if justification_required && justification.is_none() {
            return Err(CoreError::JustificationRequired {
                waste_percentage,
                threshold: self.threshold,
            });
        }

        Ok(WasteAssessment {
            waste_percentage,
            justification_required,
            justification,
            next_status,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(expected: i64, actual: i64, justification: Option<&str>) -> WasteInput {
        WasteInput {
            quote_id: QuoteId(1),
            expected_quantity: expected,
            actual_quantity: actual,
            justification: justification.map(str::to_string),
        }
    }

    #[test]
    fn test_waste_percentage() {
        assert_eq!(waste_percentage(100, 90), Decimal::new(10, 0));
        assert_eq!(waste_percentage(100, 100), Decimal::ZERO);
        assert_eq!(waste_percentage(100, 150), Decimal::ZERO);
        assert_eq!(waste_percentage(100, 0), Decimal::ONE_HUNDRED);
        // 1/3 = 33.333... and 2/3 = 66.666... round half away from zero
        assert_eq!(waste_percentage(3, 2), Decimal::new(3333, 2));
        assert_eq!(waste_percentage(3, 1), Decimal::new(6667, 2));
        // 1/8 = 12.5
        assert_eq!(waste_percentage(8, 7), Decimal::new(1250, 2));
        assert_eq!(waste_percentage(100, 90).to_string(), "10.00");
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = WastePolicy::default();
        assert!(!policy.requires_justification(Decimal::new(500, 2)));
        assert!(policy.requires_justification(Decimal::new(501, 2)));
    }

    #[test]
    fn test_justification_required_above_threshold() {
        let err = WastePolicy::default()
            .reconcile(&input(100, 90, None), QuoteStatus::Approved, false)
            .unwrap_err();
        assert!(matches!(err, CoreError::JustificationRequired { .. }));

        let err = WastePolicy::default()
            .reconcile(&input(100, 90, Some("   ")), QuoteStatus::Approved, false)
            .unwrap_err();
        assert!(matches!(err, CoreError::JustificationRequired { .. }));
    }

    #[test]
    fn test_justified_waste_completes() {
        let assessment = WastePolicy::default()
            .reconcile(
                &input(100, 90, Some("  paper jam on run 2 ")),
                QuoteStatus::Approved,
                false,
            )
            .unwrap();
        assert!(assessment.justification_required);
        assert_eq!(assessment.justification.as_deref(), Some("paper jam on run 2"));
        assert_eq!(assessment.next_status, QuoteStatus::Completed);
    }

    #[test]
    fn test_no_waste_needs_no_justification() {
        let assessment = WastePolicy::default()
            .reconcile(&input(100, 100, None), QuoteStatus::Approved, false)
            .unwrap();
        assert_eq!(assessment.waste_percentage, Decimal::ZERO);
        assert!(!assessment.justification_required);
        assert_eq!(assessment.justification, None);
    }

    #[test]
    fn test_invalid_quantities_checked_first() {
        let err = WastePolicy::default()
            .reconcile(&input(0, 10, None), QuoteStatus::Pending, true)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));

        let err = WastePolicy::default()
            .reconcile(&input(10, -1, None), QuoteStatus::Approved, false)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_duplicate_reported_before_status() {
        let err = WastePolicy::default()
            .reconcile(&input(100, 100, None), QuoteStatus::Completed, true)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_only_approved_quotes_reconcile() {
        for status in [QuoteStatus::Pending, QuoteStatus::Rejected, QuoteStatus::Completed] {
            let err = WastePolicy::default()
                .reconcile(&input(100, 100, None), status, false)
                .unwrap_err();
            assert!(matches!(err, CoreError::InvalidStateTransition { .. }), "{status}");
        }
    }

    #[test]
    fn test_custom_threshold() {
        let policy = WastePolicy::new(Decimal::new(15, 0));
        assert!(policy
            .reconcile(&input(100, 90, None), QuoteStatus::Approved, false)
            .is_ok());
    }
}
