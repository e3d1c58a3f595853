//! # Repository Module
//!
//! Database repository implementations for Cantina.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  View layer                                                     │
//! │       │  db.shifts().record_sale(product_id, 2)                 │
//! │       ▼                                                         │
//! │  ShiftRepository                                                │
//! │  ├── opens ONE transaction                                      │
//! │  ├── re-reads the open shift and the bar stock inside it        │
//! │  ├── writes the sale row + stock debit together                 │
//! │  └── publishes change events after commit                       │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite database                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cross-aggregate effects (a purchase touching stock, provider balance, and
//! the cash ledger) compose through `pub(crate)` helpers that take the
//! transaction's connection, so one repository's operation can carry another
//! ledger's write inside its own atomic unit.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD; creates the stock pair
//! - [`stock::StockRepository`] - Stock ledger and warehouse→bar transfer
//! - [`provider::ProviderRepository`] - Providers and their settlement
//! - [`worker::WorkerRepository`] - Workers
//! - [`purchase::PurchaseRepository`] - Purchase recording
//! - [`shift::ShiftRepository`] - Shift lifecycle, sales, loans, close-out
//! - [`cashflow::CashflowRepository`] - Cash ledger and running balance

pub mod cashflow;
pub mod product;
pub mod provider;
pub mod purchase;
pub mod shift;
pub mod stock;
pub mod worker;
