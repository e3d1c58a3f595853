//! # Purchase Repository
//!
//! Records goods received from a provider into the warehouse.
//!
//! ## One Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  record(provider, product, 2, Box, settlement)                  │
//! │                                                                 │
//! │  1. purchase row              (48 units, 96.000 total)          │
//! │  2. warehouse stock  += 48                                      │
//! │  3a. consignment: provider pending_balance += 96.000            │
//! │  3b. cash:        CashflowEntry(expense, 96.000) + counter      │
//! │                                                                 │
//! │  All effects commit together or none do.                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::DbResult;
use crate::repository::{cashflow, product, provider, stock};
use cantina_core::{
    to_base_units, CoreError, EntryType, Purchase, PurchaseUnit, SettlementType, StockLocation,
};

/// Repository for purchase recording.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        PurchaseRepository { pool, notifier }
    }

    /// Records a purchase: appends the purchase row, credits warehouse
    /// stock, and settles the money side per `settlement_type`.
    ///
    /// ## Arguments
    /// * `quantity` / `unit` - as entered on the form; expanded to base
    ///   units before anything is written
    /// * `settlement_type` - `Cash` debits the cash ledger now;
    ///   `Consignment` accrues the provider's payable balance instead
    pub async fn record(
        &self,
        provider_id: &str,
        product_id: &str,
        quantity: i64,
        unit: PurchaseUnit,
        settlement_type: SettlementType,
    ) -> DbResult<Purchase> {
        let product = product::require(&self.pool, product_id).await?;
        provider::require(&self.pool, provider_id).await?;

        let units = to_base_units(quantity, unit, &product).map_err(CoreError::from)?;
        let total_cost = product.purchase_cost().multiply_units(units);

        debug!(
            provider_id = %provider_id,
            product_id = %product_id,
            units = %units,
            total_cost = %total_cost,
            settlement_type = ?settlement_type,
            "Recording purchase"
        );

        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            provider_id: provider_id.to_string(),
            product_id: product_id.to_string(),
            settlement_type,
            units,
            total_cost: total_cost.pesos(),
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO purchases \
                 (id, provider_id, product_id, settlement_type, units, total_cost, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&purchase.id)
        .bind(&purchase.provider_id)
        .bind(&purchase.product_id)
        .bind(purchase.settlement_type)
        .bind(purchase.units)
        .bind(purchase.total_cost)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await?;

        stock::adjust(&mut tx, product_id, StockLocation::Warehouse, units).await?;

        let money_collection = match settlement_type {
            SettlementType::Consignment => {
                provider::credit_balance(&mut tx, provider_id, total_cost).await?;
                Collection::Providers
            }
            SettlementType::Cash => {
                let entry = cashflow::new_entry(
                    EntryType::Expense,
                    total_cost,
                    format!("Cash purchase: {}x {}", units, product.name),
                );
                cashflow::append_entry(&mut tx, &entry).await?;
                Collection::Cashflow
            }
        };

        tx.commit().await?;

        self.notifier.publish_all(&[
            Collection::Purchases,
            Collection::StockLevels,
            money_collection,
        ]);

        Ok(purchase)
    }

    /// The most recent purchases, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            "SELECT id, provider_id, product_id, settlement_type, units, total_cost, created_at \
             FROM purchases ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
