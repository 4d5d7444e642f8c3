//! # Validation Module
//!
//! Field-level input checks for the marketplace engines.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: External API layer                                           │
//! │  ├── DTO shape, required fields                                        │
//! │  └── Authentication / roles                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engines (maskstore-db)                                       │
//! │  └── THIS MODULE: numeric bounds, text limits, paging                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (cash_balance_cents >= 0, quantity >= 0, ...)               │
//! │  ├── UNIQUE (pharmacy_id, mask_type_id)                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Every check here runs before the first write of a unit of work.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use maskstore_core::validation::{validate_purchase_quantity, validate_search_limit};
//!
//! assert!(validate_purchase_quantity(5).is_ok());
//! assert!(validate_purchase_quantity(0).is_err());
//! assert!(validate_search_limit(10, 100).is_ok());
//! ```

use crate::error::ValidationError;
use crate::{MAX_BRAND_LEN, MAX_COLOR_LEN, MAX_DISPLAY_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field against a character limit.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max` characters (counted as chars, not bytes)
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates the descriptive fields of a mask product.
///
/// ## Example
/// ```rust
/// use maskstore_core::validation::validate_mask_fields;
///
/// assert!(validate_mask_fields("MaskT", "green", "MaskT (green) (10 per pack)", 10).is_ok());
/// assert!(validate_mask_fields("", "green", "x", 10).is_err());
/// assert!(validate_mask_fields("MaskT", "green", "x", 0).is_err());
/// ```
pub fn validate_mask_fields(
    brand: &str,
    color: &str,
    display_name: &str,
    pack_size: i64,
) -> ValidationResult<()> {
    validate_text("brand", brand, MAX_BRAND_LEN)?;
    validate_text("color", color, MAX_COLOR_LEN)?;
    validate_text("display_name", display_name, MAX_DISPLAY_NAME_LEN)?;

    if pack_size <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "pack_size".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.is_empty() {
        return Err(ValidationError::Required {
            field: "query".to_string(),
        });
    }

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of one purchase line.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Bulk purchase: one item                                               │
/// │                                                                         │
/// │  { pharmacy_id, mask_type_id, quantity: 5 }                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_purchase_quantity(5) ← THIS FUNCTION                         │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock and balance checks                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_purchase_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an absolute stock level. Zero is allowed.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Example
/// ```rust
/// use maskstore_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // free
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash balance in cents set by an administrator.
pub fn validate_balance_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "cash_balance".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Paging Validators
// =============================================================================

/// Validates a search page size against the configured maximum.
pub fn validate_search_limit(limit: u32, max: u32) -> ValidationResult<()> {
    if limit == 0 || limit > max {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }

    Ok(())
}

/// Validates the size of a top-N report against the configured maximum.
pub fn validate_top_n(top_n: u32, max: u32) -> ValidationResult<()> {
    if top_n == 0 || top_n > max {
        return Err(ValidationError::OutOfRange {
            field: "top_n".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
