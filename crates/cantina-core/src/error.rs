//! # Error Types
//!
//! Domain-specific error types for cantina-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  cantina-core errors (this file)                                │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  cantina-db errors (separate crate)                             │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → DbError → caller           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity id, counts)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::StockLocation;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Every variant maps to a
/// user-facing condition; none of them leave partial state behind, because
/// the persistence layer raises them before or inside an atomic unit.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Reference to a product id that does not exist (or was deactivated).
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Reference to a provider id that does not exist.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// Reference to a worker id that does not exist.
    #[error("worker not found: {0}")]
    WorkerNotFound(String),

    /// A debit would drive a stock level negative.
    ///
    /// ## When This Occurs
    /// - Selling more than the bar holds
    /// - Transferring more than the warehouse holds
    ///
    /// The enclosing transaction aborts entirely: no stock change, no side
    /// record.
    #[error("insufficient stock at {location}: available {available}, requested {requested}")]
    InsufficientStock {
        location: StockLocation,
        available: i64,
        requested: i64,
    },

    /// A shift is already open; only one open shift is supported.
    #[error("a shift is already open")]
    ShiftAlreadyOpen,

    /// The operation requires an open shift and none exists (or the shift
    /// just closed).
    #[error("no open shift")]
    ShiftNotOpen,

    /// Provider settlement attempted with a zero or negative balance.
    #[error("provider {0} has no pending balance to settle")]
    NothingToSettle(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs; no state change has happened when one
/// of these surfaces.
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

    /// Invalid format (e.g., invalid UUID).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            location: StockLocation::Bar,
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock at bar: available 5, requested 10"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
