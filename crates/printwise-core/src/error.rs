//! # Error Types
//!
//! Domain-specific error types for printwise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  printwise-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  printwise-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError                            │
//! │                                                                         │
//! │  HTTP errors (quote-api)                                               │
//! │  └── ApiError         - What the caller sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//! Every `CoreError` maps onto exactly one [`ErrorKind`]. Callers branch on
//! the kind, never on message text.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::{QuoteAction, QuoteStatus};
use crate::types::{ClientId, FinishingId, ProductId};

// =============================================================================
// Error Kind
// =============================================================================

/// The four failure categories of the quoting workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Client, product, finishing or quote absent.
    NotFound,
    /// Missing or invalid input, duplicate waste record.
    Validation,
    /// Waste above threshold without a justification.
    JustificationRequired,
    /// Lifecycle action attempted from a state that does not permit it.
    InvalidStateTransition,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Finishing id does not resolve in the catalog.
    #[error("Finishing not found: {0}")]
    FinishingNotFound(FinishingId),

    /// Client id does not resolve.
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Quote cannot be found (by id or by token).
    ///
    /// ## When This Occurs
    /// - Unknown quote id
    /// - Unknown, malformed or expired capability token
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Large-format width or height is not strictly positive.
    #[error("Invalid dimensions: {width} x {height} cm")]
    InvalidDimensions { width: Decimal, height: Decimal },

    /// Lifecycle action not permitted from the current status.
    ///
    /// ## When This Occurs
    /// ```text
    /// approve(token)  on approved/rejected/completed
    /// reject(token)   on approved/rejected/completed
    /// reconcile(id)   on pending/rejected
    /// revise(id)      on anything but pending
    /// ```
    #[error("Cannot {action} a quote that is {from}")]
    InvalidStateTransition {
        from: QuoteStatus,
        action: QuoteAction,
    },

    /// Waste percentage is above the policy threshold and no justification
    /// was supplied. Nothing is persisted.
    #[error("Waste of {waste_percentage}% exceeds the {threshold}% threshold; a justification is required")]
    JustificationRequired {
        waste_percentage: Decimal,
        threshold: Decimal,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ClientNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::FinishingNotFound(_)
            | CoreError::QuoteNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidDimensions { .. } | CoreError::Validation(_) => {
                ErrorKind::Validation
            }
            CoreError::JustificationRequired { .. } => ErrorKind::JustificationRequired,
            CoreError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. product format does not match the job).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. second waste record for a quote).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
