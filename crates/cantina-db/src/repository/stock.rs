//! # Stock Ledger Repository
//!
//! Per-product, per-location unit counters with a non-negative invariant.
//!
//! ## The Debit Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Every debit is a guarded conditional UPDATE, inside the        │
//! │  operation's transaction:                                       │
//! │                                                                 │
//! │    UPDATE stock_levels                                          │
//! │       SET units = units + :delta                                │
//! │     WHERE product_id = :id AND location = :loc                  │
//! │       AND units + :delta >= 0                                   │
//! │                                                                 │
//! │  rows_affected = 0  →  InsufficientStock (or unknown product)   │
//! │                     →  the WHOLE transaction aborts             │
//! │                                                                 │
//! │  The guard evaluates against committed row state, so no caller  │
//! │  can debit from a stale cached count. The schema-level          │
//! │  CHECK (units >= 0) backs the same invariant.                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::DbResult;
use crate::repository::product;
use cantina_core::{to_base_units, CoreError, PurchaseUnit, StockLevel, StockLocation};

/// A product whose bar stock fell below the dashboard threshold.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LowStockItem {
    pub product_id: String,
    pub name: String,
    pub units: i64,
}

/// Repository for the stock ledger.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        StockRepository { pool, notifier }
    }

    /// Gets the stock level for one product at one location.
    pub async fn level(
        &self,
        product_id: &str,
        location: StockLocation,
    ) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(
            "SELECT product_id, location, units, updated_at \
             FROM stock_levels WHERE product_id = ? AND location = ?",
        )
        .bind(product_id)
        .bind(location)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Gets both stock levels (warehouse and bar) for one product.
    pub async fn levels(&self, product_id: &str) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            "SELECT product_id, location, units, updated_at \
             FROM stock_levels WHERE product_id = ? ORDER BY location",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Lists every stock level, for the inventory view.
    pub async fn list_all(&self) -> DbResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            "SELECT product_id, location, units, updated_at \
             FROM stock_levels ORDER BY product_id, location",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Active products whose bar stock is below `threshold`, lowest first.
    ///
    /// Dashboard derived view ("critical stock").
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<LowStockItem>> {
        let items = sqlx::query_as::<_, LowStockItem>(
            "SELECT s.product_id, p.name, s.units \
             FROM stock_levels s \
             JOIN products p ON p.id = s.product_id \
             WHERE s.location = 'bar' AND p.is_active = 1 AND s.units < ? \
             ORDER BY s.units, p.name",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Moves stock from the warehouse to the bar for one product.
    ///
    /// ## Atomicity
    /// Debit and credit run in one transaction. When the warehouse holds
    /// fewer than the requested units the transaction aborts entirely:
    /// neither location changes and the caller gets `InsufficientStock`.
    pub async fn transfer_to_bar(
        &self,
        product_id: &str,
        quantity: i64,
        unit: PurchaseUnit,
    ) -> DbResult<()> {
        let product = product::require(&self.pool, product_id).await?;
        let units = to_base_units(quantity, unit, &product).map_err(CoreError::from)?;

        debug!(product_id = %product_id, units = %units, "Transferring stock to bar");

        let mut tx = self.pool.begin().await?;

        adjust(&mut tx, product_id, StockLocation::Warehouse, -units).await?;
        adjust(&mut tx, product_id, StockLocation::Bar, units).await?;

        tx.commit().await?;

        self.notifier.publish(Collection::StockLevels);

        Ok(())
    }
}

/// Applies a delta to one stock counter inside an enclosing transaction.
///
/// Debits (`delta < 0`) are guarded: the update only applies when the
/// resulting count stays non-negative, and a guard miss aborts with
/// `InsufficientStock` carrying the committed count. Never call this outside
/// a transaction on the debit side.
pub(crate) async fn adjust(
    conn: &mut SqliteConnection,
    product_id: &str,
    location: StockLocation,
    delta: i64,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE stock_levels \
         SET units = units + ?, updated_at = ? \
         WHERE product_id = ? AND location = ? AND units + ? >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(product_id)
    .bind(location)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish "row is short" from "row does not exist"; the re-read
        // happens on the same connection, inside the same transaction.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT units FROM stock_levels WHERE product_id = ? AND location = ?")
                .bind(product_id)
                .bind(location)
                .fetch_optional(&mut *conn)
                .await?;

        return Err(match available {
            Some(available) => CoreError::InsufficientStock {
                location,
                available,
                requested: -delta,
            }
            .into(),
            None => CoreError::ProductNotFound(product_id.to_string()).into(),
        });
    }

    Ok(())
}

/// Creates the zero-initialized warehouse and bar rows for a new product.
pub(crate) async fn init_levels(conn: &mut SqliteConnection, product_id: &str) -> DbResult<()> {
    let now = Utc::now();

    for location in [StockLocation::Warehouse, StockLocation::Bar] {
        sqlx::query(
            "INSERT INTO stock_levels (product_id, location, units, updated_at) \
             VALUES (?, ?, 0, ?)",
        )
        .bind(product_id)
        .bind(location)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use crate::DbError;
    use cantina_core::Product;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_product(db: &Database) -> Product {
        db.products()
            .create(NewProduct {
                name: "Aguila 330ml".into(),
                sale_price: 3_500,
                purchase_cost: 2_000,
                token_price: 500,
                units_per_box: 24,
                units_per_basket: 30,
            })
            .await
            .unwrap()
    }

    async fn warehouse_units(db: &Database, product_id: &str) -> i64 {
        db.stock()
            .level(product_id, StockLocation::Warehouse)
            .await
            .unwrap()
            .unwrap()
            .units
    }

    async fn bar_units(db: &Database, product_id: &str) -> i64 {
        db.stock()
            .level(product_id, StockLocation::Bar)
            .await
            .unwrap()
            .unwrap()
            .units
    }

    async fn put_warehouse_stock(db: &Database, product_id: &str, units: i64) {
        let mut tx = db.pool().begin().await.unwrap();
        adjust(&mut tx, product_id, StockLocation::Warehouse, units)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_transfer_moves_units() {
        let db = test_db().await;
        let product = seeded_product(&db).await;
        put_warehouse_stock(&db, &product.id, 50).await;

        db.stock()
            .transfer_to_bar(&product.id, 2, PurchaseUnit::Box)
            .await
            .unwrap();

        assert_eq!(warehouse_units(&db, &product.id).await, 2);
        assert_eq!(bar_units(&db, &product.id).await, 48);
    }

    #[tokio::test]
    async fn test_transfer_aborts_atomically_on_insufficient_stock() {
        let db = test_db().await;
        let product = seeded_product(&db).await;
        put_warehouse_stock(&db, &product.id, 10).await;

        let err = db
            .stock()
            .transfer_to_bar(&product.id, 1, PurchaseUnit::Box)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                location,
                available,
                requested,
            }) => {
                assert_eq!(location, StockLocation::Warehouse);
                assert_eq!(available, 10);
                assert_eq!(requested, 24);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Neither side changed.
        assert_eq!(warehouse_units(&db, &product.id).await, 10);
        assert_eq!(bar_units(&db, &product.id).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_unknown_product_fails() {
        let db = test_db().await;

        let err = db
            .stock()
            .transfer_to_bar(
                "11111111-1111-1111-1111-111111111111",
                1,
                PurchaseUnit::Each,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_low_stock_lists_only_bar_shortages() {
        let db = test_db().await;
        let product = seeded_product(&db).await;
        put_warehouse_stock(&db, &product.id, 100).await;

        // Bar at 5 units: below the threshold of 10.
        db.stock()
            .transfer_to_bar(&product.id, 5, PurchaseUnit::Each)
            .await
            .unwrap();

        let low = db.stock().low_stock(10).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].units, 5);
        assert_eq!(low[0].name, "Aguila 330ml");

        // Raise bar stock above the threshold; the list empties.
        db.stock()
            .transfer_to_bar(&product.id, 20, PurchaseUnit::Each)
            .await
            .unwrap();
        assert!(db.stock().low_stock(10).await.unwrap().is_empty());
    }
}
