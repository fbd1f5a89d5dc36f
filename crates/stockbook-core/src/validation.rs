//! # Validation Module
//!
//! Input validation for the add-product form, sheet names, and report
//! settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (CLI argument parsing)                             │
//! │  └── Type checks (is it a number at all?)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules (empty name, non-positive price, ...)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger                                                       │
//! │  └── Stock never goes below zero                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//! use stockbook_core::validation::{validate_product_name, validate_sale_price};
//!
//! validate_product_name("Widget").unwrap();
//! assert!(validate_sale_price(Money::zero()).is_err());
//! ```

use chrono::format::{Item, StrftimeItems};

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_CENTS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Characters a spreadsheet refuses in worksheet titles.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a worksheet name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - None of `[ ] : * ? / \`
pub fn validate_sheet_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sheet name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "sheet name".to_string(),
            max: 100,
        });
    }

    if name.contains(FORBIDDEN_SHEET_CHARS) {
        return Err(ValidationError::InvalidFormat {
            field: "sheet name".to_string(),
            reason: "must not contain any of [ ] : * ? / \\".to_string(),
        });
    }

    Ok(())
}

/// Validates a chrono `strftime` pattern used for the `Data` column.
///
/// ```rust
/// use stockbook_core::validation::validate_date_format;
///
/// assert!(validate_date_format("%d/%m/%Y %H:%M:%S").is_ok());
/// assert!(validate_date_format("%Q").is_err());
/// ```
pub fn validate_date_format(pattern: &str) -> ValidationResult<()> {
    if pattern.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "date format".to_string(),
        });
    }

    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ValidationError::InvalidFormat {
            field: "date format".to_string(),
            reason: format!("'{}' is not a valid strftime pattern", pattern),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit cost.
///
/// ## Rules
/// - Zero is allowed (free samples), negative is not
/// - Must not exceed MAX_AMOUNT_CENTS
pub fn validate_unit_cost(cost: Money) -> ValidationResult<()> {
    if cost.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit cost".to_string(),
        });
    }

    validate_amount_bound("unit cost", cost)
}

/// Validates a resulting sale price, which must be strictly positive and
/// within MAX_AMOUNT_CENTS.
pub fn validate_sale_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "sale price".to_string(),
        });
    }

    validate_amount_bound("sale price", price)
}

/// Rejects amounts whose magnitude is above MAX_AMOUNT_CENTS.
pub fn validate_amount_bound(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.cents().unsigned_abs() > MAX_AMOUNT_CENTS as u64 {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS),
        });
    }

    Ok(())
}

/// Validates an initial stock quantity.
///
/// ## Rules
/// - Zero is allowed (product registered before the stock arrives)
/// - Must not exceed MAX_STOCK_QUANTITY
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a profit goal. Zero disables goal tracking.
pub fn validate_profit_goal(goal: Money) -> ValidationResult<()> {
    if goal.is_negative() {
        return Err(ValidationError::Negative {
            field: "profit goal".to_string(),
        });
    }

    Ok(())
}
