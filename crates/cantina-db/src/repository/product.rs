//! # Product Repository
//!
//! Catalog operations. Creating a product also creates its two
//! zero-initialized stock levels (warehouse and bar) in the same
//! transaction, so every product the ledger can see always has both
//! counters.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::DbResult;
use crate::repository::stock;
use cantina_core::validation::{validate_name, validate_pack_size, validate_price};
use cantina_core::{CoreError, Product};

/// Column list shared by every product query.
const PRODUCT_COLUMNS: &str = "id, name, sale_price, purchase_cost, token_price, \
     units_per_box, units_per_basket, is_active, created_at, updated_at";

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sale_price: i64,
    pub purchase_cost: i64,
    pub token_price: i64,
    pub units_per_box: i64,
    pub units_per_basket: i64,
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        ProductRepository { pool, notifier }
    }

    /// Creates a product and its two stock levels atomically.
    ///
    /// ## What This Does
    /// 1. Validates the input (name, prices, pack sizes)
    /// 2. Inserts the product row
    /// 3. Inserts zero-initialized stock rows for warehouse and bar
    ///
    /// All three inserts commit together or not at all.
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        validate_name("name", &new.name).map_err(CoreError::from)?;
        validate_price("sale_price", new.sale_price).map_err(CoreError::from)?;
        validate_price("purchase_cost", new.purchase_cost).map_err(CoreError::from)?;
        validate_price("token_price", new.token_price).map_err(CoreError::from)?;
        validate_pack_size("units_per_box", new.units_per_box).map_err(CoreError::from)?;
        validate_pack_size("units_per_basket", new.units_per_basket).map_err(CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            sale_price: new.sale_price,
            purchase_cost: new.purchase_cost,
            token_price: new.token_price,
            units_per_box: new.units_per_box,
            units_per_basket: new.units_per_basket,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO products ( \
                 id, name, sale_price, purchase_cost, token_price, \
                 units_per_box, units_per_basket, is_active, created_at, updated_at \
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.sale_price)
        .bind(product.purchase_cost)
        .bind(product.token_price)
        .bind(product.units_per_box)
        .bind(product.units_per_basket)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        stock::init_levels(&mut tx, &product.id).await?;

        tx.commit().await?;

        self.notifier
            .publish_all(&[Collection::Products, Collection::StockLevels]);

        Ok(product)
    }

    /// Updates a product's mutable attributes.
    ///
    /// Identity is immutable; prices and pack sizes already snapshotted into
    /// purchases, sales, and transfers are unaffected.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_name("name", &product.name).map_err(CoreError::from)?;
        validate_price("sale_price", product.sale_price).map_err(CoreError::from)?;
        validate_price("purchase_cost", product.purchase_cost).map_err(CoreError::from)?;
        validate_price("token_price", product.token_price).map_err(CoreError::from)?;
        validate_pack_size("units_per_box", product.units_per_box).map_err(CoreError::from)?;
        validate_pack_size("units_per_basket", product.units_per_basket)
            .map_err(CoreError::from)?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
                 name = ?, sale_price = ?, purchase_cost = ?, token_price = ?, \
                 units_per_box = ?, units_per_basket = ?, is_active = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(product.sale_price)
        .bind(product.purchase_cost)
        .bind(product.token_price)
        .bind(product.units_per_box)
        .bind(product.units_per_basket)
        .bind(product.is_active)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(product.id.clone()).into());
        }

        self.notifier.publish(Collection::Products);

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID, failing when it does not exist.
    pub async fn require(&self, id: &str) -> DbResult<Product> {
        require(&self.pool, id).await
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists all products (including inactive) sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Resolves a product id or fails with `ProductNotFound`.
///
/// Used by the purchase recorder, transfer operator, and shift engine to
/// snapshot prices and pack sizes before opening their transactions.
pub(crate) async fn require(pool: &SqlitePool, id: &str) -> DbResult<Product> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    product.ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cantina_core::StockLocation;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn beer() -> NewProduct {
        NewProduct {
            name: "Aguila 330ml".into(),
            sale_price: 3_500,
            purchase_cost: 2_000,
            token_price: 500,
            units_per_box: 24,
            units_per_basket: 30,
        }
    }

    #[tokio::test]
    async fn test_create_initializes_both_stock_levels() {
        let db = test_db().await;
        let product = db.products().create(beer()).await.unwrap();

        let warehouse = db
            .stock()
            .level(&product.id, StockLocation::Warehouse)
            .await
            .unwrap()
            .unwrap();
        let bar = db
            .stock()
            .level(&product.id, StockLocation::Bar)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(warehouse.units, 0);
        assert_eq!(bar.units, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = test_db().await;

        let mut bad = beer();
        bad.name = "  ".into();
        assert!(db.products().create(bad).await.is_err());

        let mut bad = beer();
        bad.sale_price = -1;
        assert!(db.products().create(bad).await.is_err());

        let mut bad = beer();
        bad.units_per_box = 0;
        assert!(db.products().create(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_get() {
        let db = test_db().await;
        let mut product = db.products().create(beer()).await.unwrap();

        product.sale_price = 4_000;
        product.is_active = false;
        db.products().update(&product).await.unwrap();

        let reloaded = db.products().get(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.sale_price, 4_000);
        assert!(!reloaded.is_active);

        assert_eq!(db.products().list_active().await.unwrap().len(), 0);
        assert_eq!(db.products().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_product_fails() {
        let db = test_db().await;
        let mut product = db.products().create(beer()).await.unwrap();
        product.id = "11111111-1111-1111-1111-111111111111".into();

        let err = db.products().update(&product).await.unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }
}
