//! # Unit Conversion
//!
//! Quantities arrive from the entry forms as "3 boxes" or "2 baskets"; every
//! ledger record stores base units only. This module is the single place that
//! expansion happens.
//!
//! ## Example
//! ```rust
//! use cantina_core::types::PurchaseUnit;
//! use cantina_core::units::to_base_units;
//! # use cantina_core::types::Product;
//! # use chrono::Utc;
//! # let product = Product {
//! #     id: "p1".into(), name: "Aguila".into(), sale_price: 3_500,
//! #     purchase_cost: 2_000, token_price: 500, units_per_box: 24,
//! #     units_per_basket: 30, is_active: true,
//! #     created_at: Utc::now(), updated_at: Utc::now(),
//! # };
//! let units = to_base_units(2, PurchaseUnit::Box, &product).unwrap();
//! assert_eq!(units, 48);
//! ```

use crate::error::ValidationError;
use crate::types::{Product, PurchaseUnit};
use crate::validation::validate_quantity;

/// Expands a quantity expressed in `unit` to base units for `product`.
///
/// ## Rules
/// - `Each` is the identity
/// - `Box` multiplies by `units_per_box`
/// - `Basket` multiplies by `units_per_basket`
///
/// Fails when the quantity is non-positive or exceeds
/// [`MAX_OPERATION_QUANTITY`](crate::MAX_OPERATION_QUANTITY). Pack sizes are
/// bounded at the product write boundary, so the product of the two cannot
/// overflow i64. Pure; no side effects.
pub fn to_base_units(
    quantity: i64,
    unit: PurchaseUnit,
    product: &Product,
) -> Result<i64, ValidationError> {
    validate_quantity(quantity)?;

    let units = match unit {
        PurchaseUnit::Each => quantity,
        PurchaseUnit::Box => quantity * product.units_per_box,
        PurchaseUnit::Basket => quantity * product.units_per_basket,
    };

    Ok(units)
}
