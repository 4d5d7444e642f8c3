//! # Error Types
//!
//! Domain-specific error types for maskstore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  maskstore-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - The five abstract kinds + storage kinds        │
//! │                                                                         │
//! │  maskstore-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ErrorKind → API layer   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (IDs, names, amounts)
//! 3. Every error answers `kind()` so callers never parse message strings

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Error Kind
// =============================================================================

/// Structured failure kind reported to the external API layer.
///
/// ## Suggested HTTP mapping
/// ```text
/// NotFound          → 404
/// InvalidArgument   → 400
/// InsufficientFunds → 422
/// InsufficientStock → 422
/// InvalidState      → 409
/// Conflict          → 409 (retryable)
/// Storage           → 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InsufficientFunds,
    InsufficientStock,
    InvalidState,
    /// Concurrent writer held the row; the caller may retry.
    Conflict,
    Storage,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced user, pharmacy, mask type, inventory row, or purchase
    /// history does not exist.
    ///
    /// Purchase histories owned by another user are reported the same way.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Malformed or logically inconsistent input.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The buyer cannot cover the combined order total.
    #[error("Insufficient balance for user {user_id}: available {available}, required {required}")]
    InsufficientFunds {
        user_id: String,
        available: Money,
        required: Money,
    },

    /// The pharmacy cannot cover a refund without going below zero.
    #[error("Insufficient balance for pharmacy {pharmacy_id}: available {available}, refund {required}")]
    PharmacyInsufficientFunds {
        pharmacy_id: String,
        available: Money,
        required: Money,
    },

    /// Requested quantity exceeds what the inventory row holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Purchase (qty: 5) ──► inventory.quantity = 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole multi-item purchase rejected, nothing debited
    /// ```
    #[error("Insufficient stock of {mask} at {pharmacy}: available {available}, requested {requested}")]
    InsufficientStock {
        pharmacy: String,
        mask: String,
        available: i64,
        requested: i64,
    },

    /// The pharmacy has never stocked this mask type.
    #[error("{pharmacy} has no stock record for {mask}")]
    NoStockRecord { pharmacy: String, mask: String },

    /// Operation not permitted in the record's current status.
    #[error("{entity} {id} is {status}: {reason}")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidArgument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns the abstract kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InvalidArgument { .. } | CoreError::Validation(_) => {
                ErrorKind::InvalidArgument
            }
            CoreError::InsufficientFunds { .. } | CoreError::PharmacyInsufficientFunds { .. } => {
                ErrorKind::InsufficientFunds
            }
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::NoStockRecord { .. } | CoreError::InvalidState { .. } => {
                ErrorKind::InvalidState
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic or storage access runs.
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

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
