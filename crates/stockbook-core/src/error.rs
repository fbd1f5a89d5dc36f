//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule failures, malformed sheet rows   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── DbError          - Table store failures (wraps CoreError)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CLI message             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error here is fatal: every failing operation leaves the ledger and the
//! journal exactly as they were.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product matches the given name or id.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product has no stock left to sell.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell "Widget" (+1)
    ///      │
    ///      ▼
    /// Check stock: available=0
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Widget", available: 0 }
    ///      │
    ///      ▼
    /// UI shows: "Widget is out of stock", nothing is written
    /// ```
    #[error("Insufficient stock for {name}: available {available}")]
    InsufficientStock { name: String, available: u32 },

    /// A sheet row could not be decoded into a record.
    ///
    /// `row` is zero-based and counts data rows only (no header).
    #[error("Malformed row {row}, column '{column}': {reason}")]
    MalformedRow {
        row: usize,
        column: String,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MalformedRow error.
    pub fn malformed(row: usize, column: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedRow {
            row,
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors the operator caused and can correct.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::InsufficientStock { .. }
                | CoreError::Validation(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amount exceeds what the ledger can total.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: Money },

    /// Invalid format (e.g., unparsable number or date pattern).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Widget".to_string(),
            available: 0,
        };
        assert_eq!(err.to_string(), "Insufficient stock for Widget: available 0");

        let err = CoreError::malformed(3, "Custo", "not a number");
        assert_eq!(
            err.to_string(),
            "Malformed row 3, column 'Custo': not a number"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "sale price".to_string(),
        };
        assert_eq!(err.to_string(), "sale price must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_user_error());
        assert!(!CoreError::malformed(0, "Data", "bad").is_user_error());
    }
}
