//! # cantina-core: Pure Business Logic for Cantina
//!
//! This crate is the **heart** of Cantina, a point-of-sale and inventory
//! engine for a small bar operation. It contains all business rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Cantina Architecture                         │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐ │
//! │  │                     View Layer (SPA)                      │ │
//! │  │   Dashboard ── Inventory ── Shifts ── Providers ── Cash   │ │
//! │  └──────────────────────────┬────────────────────────────────┘ │
//! │                             │ change subscriptions + reads      │
//! │  ┌──────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ cantina-core (THIS CRATE) ★                │ │
//! │  │                                                           │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐     │ │
//! │  │   │  types  │ │  money  │ │  units  │ │ settlement │     │ │
//! │  │   │ Product │ │  Money  │ │ box/    │ │ shift math │     │ │
//! │  │   │  Shift  │ │ arith.  │ │ basket  │ │ cash sums  │     │ │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘     │ │
//! │  │                                                           │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │ │
//! │  └──────────────────────────┬────────────────────────────────┘ │
//! │                             │                                   │
//! │  ┌──────────────────────────▼────────────────────────────────┐ │
//! │  │                cantina-db (Ledger Engine)                 │ │
//! │  │        SQLite transactions, repositories, migrations      │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Shift, CashflowEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`units`] - Pure unit conversion (each / box / basket)
//! - [`settlement`] - Shift summary and cash ledger arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole pesos (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use settlement::{signed_sum, summarize_shift};
pub use types::*;
pub use units::to_base_units;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted by a single purchase, transfer, or sale.
///
/// ## Business Reason
/// Catches fat-finger input (e.g. typing 10000 instead of 10) before it
/// reaches the stock ledger. Conversion to base units may multiply this by a
/// pack size, so the bound also keeps all totals far from i64 overflow.
pub const MAX_OPERATION_QUANTITY: i64 = 10_000;

/// Maximum units a box or basket may contain.
pub const MAX_PACK_SIZE: i64 = 1_000;

/// Bar-stock level below which a product shows up on the dashboard as
/// critical.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of cashflow entries kept in the display window.
///
/// The cash balance itself is NOT derived from this window; it is a running
/// counter maintained transactionally with every append.
pub const RECENT_CASHFLOW_LIMIT: u32 = 50;
