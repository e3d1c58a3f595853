//! # cantina-db: Ledger Engine for Cantina
//!
//! This crate provides database access for the Cantina inventory and
//! shift-settlement engine. It uses SQLite for storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Cantina Data Flow                         │
//! │                                                                 │
//! │  View layer (record_sale, transfer_to_bar, ...)                 │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                  cantina-db (THIS CRATE)                  │  │
//! │  │                                                           │  │
//! │  │  ┌────────────┐   ┌──────────────┐   ┌───────────────┐    │  │
//! │  │  │  Database  │   │ Repositories │   │  Migrations   │    │  │
//! │  │  │ (pool.rs)  │◄──│ stock, shift │   │  (embedded)   │    │  │
//! │  │  │            │   │ purchase, …  │   │ 001_init.sql  │    │  │
//! │  │  └────────────┘   └──────┬───────┘   └───────────────┘    │  │
//! │  │                         │ change events (broadcast)       │  │
//! │  └─────────────────────────┼─────────────────────────────────┘  │
//! │                            ▼                                    │
//! │  Subscribers re-query through the repositories                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Read Paths
//!
//! Consumers keep whatever presentation cache they like, fed by
//! [`changes::ChangeNotifier`] events - that cache is eventually consistent
//! and UI-only. Correctness-critical values (stock counts, pending balances,
//! the open shift) are NEVER taken from it: every mutating operation re-reads
//! authoritative state inside its own transaction.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`changes`] - Post-commit change notifications
//! - [`repository`] - Repository implementations (stock, shift, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cantina_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cantina.db")).await?;
//!
//! db.stock().transfer_to_bar("product-id", 2, PurchaseUnit::Box).await?;
//! let balance = db.cashflow().current_balance().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod changes;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use changes::{ChangeEvent, ChangeNotifier, Collection};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cashflow::CashflowRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::provider::ProviderRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::shift::ShiftRepository;
pub use repository::stock::{LowStockItem, StockRepository};
pub use repository::worker::WorkerRepository;
