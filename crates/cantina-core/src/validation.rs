//! # Validation Module
//!
//! Input validation at the write boundary. Every entity shape is explicit
//! (see [`types`](crate::types)); these checks reject malformed values
//! before any business logic runs, so a validation failure never leaves
//! partial state behind.
//!
//! ## Usage
//! ```rust
//! use cantina_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Aguila 330ml").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_OPERATION_QUANTITY, MAX_PACK_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, provider, worker).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a free-text description (loans, manual cash movements).
///
/// Same rules as names but with a longer cap.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity entered for a purchase, transfer, or sale.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_OPERATION_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_OPERATION_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_OPERATION_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount that must be strictly positive (loan values,
/// manual cash movements).
pub fn validate_amount(pesos: i64) -> ValidationResult<()> {
    if pesos <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a price or cost in pesos.
///
/// Zero is allowed: a product can carry no token price, a worker no base pay.
pub fn validate_price(field: &str, pesos: i64) -> ValidationResult<()> {
    if pesos < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a pack size (units per box / basket).
///
/// ## Rules
/// - At least 1 (a pack of one is just the unit itself)
/// - At most [`MAX_PACK_SIZE`], which keeps converted quantities far from
///   overflow
pub fn validate_pack_size(field: &str, units: i64) -> ValidationResult<()> {
    if !(1..=MAX_PACK_SIZE).contains(&units) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_PACK_SIZE,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Aguila 330ml").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("weekend advance").is_ok());
        assert!(validate_description("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_OPERATION_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_OPERATION_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(2_000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-500).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("sale_price", 0).is_ok());
        assert!(validate_price("sale_price", 3_500).is_ok());
        assert!(validate_price("sale_price", -100).is_err());
    }

    #[test]
    fn test_validate_pack_size() {
        assert!(validate_pack_size("units_per_box", 1).is_ok());
        assert!(validate_pack_size("units_per_box", 24).is_ok());
        assert!(validate_pack_size("units_per_box", 0).is_err());
        assert!(validate_pack_size("units_per_box", MAX_PACK_SIZE + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
