//! # Validation Module
//!
//! Input validation for quote and waste requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (quote-api)                                             │
//! │  └── Type validation (JSON deserialization, path/query parsing)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Core (Rust)                                                  │
//! │  └── THIS MODULE: field rules, run before any lookup or write          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (status, format, total = unit × qty)            │
//! │  ├── UNIQUE constraints (token, one waste record per quote)            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use printwise_core::validation::{validate_quantity, validate_title};
//!
//! validate_quantity(250).unwrap();
//! assert_eq!(validate_title("  Flyers A5  ").unwrap(), "Flyers A5");
//! ```

use crate::error::ValidationError;
use crate::MAX_QUOTE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quote title length (characters).
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of free-text fields (description, reason, justification).
pub const MAX_TEXT_LEN: usize = 2000;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quote quantity.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_QUOTE_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_QUOTE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUOTE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a small-format color count.
pub fn validate_colors(colors: i64) -> ValidationResult<()> {
    if colors <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "colors".to_string(),
        });
    }

    Ok(())
}

/// Validates production counts for waste reconciliation.
///
/// ## Rules
/// - `expected_quantity` must be positive
/// - `actual_quantity` must not be negative (overproduction is fine)
pub fn validate_waste_quantities(expected: i64, actual: i64) -> ValidationResult<()> {
    if expected <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "expected_quantity".to_string(),
        });
    }

    if actual < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "actual_quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a quote title and returns it trimmed.
///
/// ## Example
/// ```rust
/// use printwise_core::validation::validate_title;
///
/// assert!(validate_title("Business cards").is_ok());
/// assert!(validate_title("   ").is_err());
/// assert!(validate_title(&"x".repeat(201)).is_err());
/// ```
pub fn validate_title(title: &str) -> ValidationResult<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(title.to_string())
}

/// Trims optional free text. Blank input becomes `None`.
///
/// ## Returns
/// The trimmed text, or `None` if nothing but whitespace was given.
pub fn normalize_optional_text(field: &str, text: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(Some(text.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUOTE_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-5).is_err());
        assert!(matches!(
            validate_quantity(MAX_QUOTE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_colors() {
        assert!(validate_colors(1).is_ok());
        assert!(validate_colors(4).is_ok());
        assert!(validate_colors(0).is_err());
    }

    #[test]
    fn test_validate_waste_quantities() {
        assert!(validate_waste_quantities(100, 0).is_ok());
        assert!(validate_waste_quantities(100, 120).is_ok());
        assert!(matches!(
            validate_waste_quantities(0, 10),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_waste_quantities(100, -1),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Posters  ").unwrap(), "Posters");
        assert!(validate_title("").is_err());
        assert!(validate_title(&"é".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"a".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text("reason", None).unwrap(), None);
        assert_eq!(normalize_optional_text("reason", Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_optional_text("reason", Some("  too pricey ")).unwrap(),
            Some("too pricey".to_string())
        );
        assert!(normalize_optional_text("reason", Some(&"a".repeat(MAX_TEXT_LEN + 1))).is_err());
    }
}
