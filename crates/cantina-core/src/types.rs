//! # Domain Types
//!
//! Core domain types used throughout Cantina.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                            │
//! │                                                                 │
//! │  Reference data          Ledgers                Settlements     │
//! │  ┌──────────────┐        ┌───────────────┐      ┌────────────┐  │
//! │  │   Product    │        │  StockLevel   │      │  Worker-   │  │
//! │  │   Provider   │        │  CashflowEntry│      │  Provider- │  │
//! │  │   Worker     │        │  Purchase     │      │  Settlement│  │
//! │  └──────────────┘        └───────────────┘      └────────────┘  │
//! │                                                                 │
//! │  Shift lifecycle                                                │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │  Shift { status: open } ── Sale* ── Loan* ── closed      │   │
//! │  │                                      + ShiftSummary      │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity has a UUID v4 `id`, immutable once created. Monetary fields
//! are stored as raw `i64` pesos (mirroring the database columns) with
//! [`Money`] accessors for arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Stock Location
// =============================================================================

/// The two stock locations tracked by the inventory ledger.
///
/// Goods arrive into the warehouse via purchases and move to the bar via
/// transfers; sales debit the bar only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockLocation {
    Warehouse,
    Bar,
}

impl StockLocation {
    /// Stable string form, matching the database column values.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockLocation::Warehouse => "warehouse",
            StockLocation::Bar => "bar",
        }
    }
}

impl fmt::Display for StockLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Purchases, transfers, and sales reference products by id; prices and pack
/// sizes are snapshotted into those records at write time, so later edits
/// never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Price per unit when sold at the bar.
    pub sale_price: i64,

    /// Cost per unit when purchased from a provider.
    pub purchase_cost: i64,

    /// Token ("ficha") credit earned by the worker per unit sold.
    pub token_price: i64,

    /// Units contained in one box.
    pub units_per_box: i64,

    /// Units contained in one basket.
    pub units_per_basket: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_pesos(self.sale_price)
    }

    /// Returns the purchase cost as Money.
    #[inline]
    pub fn purchase_cost(&self) -> Money {
        Money::from_pesos(self.purchase_cost)
    }

    /// Returns the token price as Money.
    #[inline]
    pub fn token_price(&self) -> Money {
        Money::from_pesos(self.token_price)
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// One per-product, per-location unit counter.
///
/// Invariant: `units >= 0`. Every debit runs as a guarded conditional update
/// inside a transaction; the schema CHECK backs the same rule.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub product_id: String,
    pub location: StockLocation,
    pub units: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Provider
// =============================================================================

/// A supplier of products.
///
/// `pending_balance` accrues on consignment purchases and resets to zero on
/// settlement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Provider {
    pub id: String,
    pub name: String,
    /// Phone or email.
    pub contact: Option<String>,
    /// Whether goods may be received on consignment.
    pub accepts_consignment: bool,
    /// Money owed to this provider for consignment purchases.
    pub pending_balance: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Returns the pending balance as Money.
    #[inline]
    pub fn pending_balance(&self) -> Money {
        Money::from_pesos(self.pending_balance)
    }
}

// =============================================================================
// Worker
// =============================================================================

/// A bar worker who runs shifts.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Worker {
    pub id: String,
    pub name: String,
    /// Base pay per shift, snapshotted into each shift at open time.
    pub base_pay: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    /// Returns the base pay as Money.
    #[inline]
    pub fn base_pay(&self) -> Money {
        Money::from_pesos(self.base_pay)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// How a purchase is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SettlementType {
    /// Paid immediately; debits the cash ledger.
    Cash,
    /// Received on consignment; credits the provider's pending balance.
    Consignment,
}

/// The unit a quantity is expressed in at the point of entry.
///
/// Converted to base units before any record is written; nothing downstream
/// ever sees boxes or baskets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseUnit {
    Each,
    Box,
    Basket,
}

/// An append-only record of goods received into the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub provider_id: String,
    pub product_id: String,
    pub settlement_type: SettlementType,
    /// Quantity in base units (boxes/baskets already expanded).
    pub units: i64,
    /// `units × purchase_cost` at the time of purchase.
    pub total_cost: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the total cost as Money.
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_pesos(self.total_cost)
    }
}

// =============================================================================
// Shift
// =============================================================================

/// The status of a worker shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    /// Sales and loans may be recorded.
    Open,
    /// Terminal; the summary is frozen and the shift is unreachable for
    /// further sales or loans.
    Closed,
}

/// A bounded working session for one worker.
///
/// At most one shift is open system-wide. Worker name and base pay are
/// snapshots taken at open time; the summary columns are NULL until close.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub worker_id: String,
    /// Worker name at open time (frozen).
    pub worker_name: String,
    /// Base pay at open time (frozen).
    pub base_pay: i64,
    pub status: ShiftStatus,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub gross_revenue: Option<i64>,
    pub token_earnings: Option<i64>,
    pub loans_total: Option<i64>,
    pub net_payable: Option<i64>,
}

impl Shift {
    /// Returns the frozen summary of a closed shift, or None while open.
    pub fn summary(&self) -> Option<ShiftSummary> {
        Some(ShiftSummary {
            gross_revenue: Money::from_pesos(self.gross_revenue?),
            token_earnings: Money::from_pesos(self.token_earnings?),
            loans_total: Money::from_pesos(self.loans_total?),
            base_pay: Money::from_pesos(self.base_pay),
            net_payable: Money::from_pesos(self.net_payable?),
        })
    }
}

/// The computed close-out of a shift.
///
/// `net_payable = base_pay + token_earnings - loans_total`. May be negative
/// when loans exceed earnings; the engine records it as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftSummary {
    pub gross_revenue: Money,
    pub token_earnings: Money,
    pub loans_total: Money,
    pub base_pay: Money,
    pub net_payable: Money,
}

// =============================================================================
// Sale & Loan
// =============================================================================

/// A line sold during an open shift.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub shift_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Units sold, always base units.
    pub units: i64,
    /// Sale price per unit at time of sale (frozen).
    pub unit_sale_price: i64,
    /// Token price per unit at time of sale (frozen).
    pub unit_token_price: i64,
    /// `units × unit_sale_price`.
    pub total_sale: i64,
    /// `units × unit_token_price`.
    pub total_tokens: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total_sale(&self) -> Money {
        Money::from_pesos(self.total_sale)
    }

    /// Returns the token total as Money.
    #[inline]
    pub fn total_tokens(&self) -> Money {
        Money::from_pesos(self.total_tokens)
    }
}

/// A cash advance taken by the worker during an open shift.
///
/// No guard against borrowing more than earned; the difference simply shows
/// up as negative net payable at close.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Loan {
    pub id: String,
    pub shift_id: String,
    pub description: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Returns the loan amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_pesos(self.amount)
    }
}

// =============================================================================
// Settlements
// =============================================================================

/// Immutable record created when a shift closes; one-to-one with the shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WorkerSettlement {
    pub id: String,
    pub shift_id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub gross_revenue: i64,
    pub token_earnings: i64,
    pub loans_total: i64,
    pub base_pay: i64,
    pub net_payable: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl WorkerSettlement {
    /// Returns the net payable as Money.
    #[inline]
    pub fn net_payable(&self) -> Money {
        Money::from_pesos(self.net_payable)
    }
}

/// Immutable record created when a provider's pending balance is paid off.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProviderSettlement {
    pub id: String,
    pub provider_id: String,
    pub amount_paid: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Ledger
// =============================================================================

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

/// An append-only signed cash movement.
///
/// `amount` is always positive; the sign comes from `entry_type`. Entries
/// are written by the purchase recorder (cash purchases), the shift engine
/// (close-out), the provider settlement, and manual entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashflowEntry {
    pub id: String,
    pub entry_type: EntryType,
    pub amount: i64,
    pub description: String,
    /// True for movements entered by hand rather than derived from an
    /// operation.
    pub is_manual: bool,
    /// Actor id for manual entries.
    pub recorded_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CashflowEntry {
    /// Returns the entry's contribution to the balance: positive for income,
    /// negative for expense.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        match self.entry_type {
            EntryType::Income => Money::from_pesos(self.amount),
            EntryType::Expense => Money::from_pesos(-self.amount),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
