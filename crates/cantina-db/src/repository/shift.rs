//! # Shift Repository
//!
//! The shift state machine and its ledgers.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Shift Lifecycle                            │
//! │                                                                 │
//! │  1. OPEN                                                        │
//! │     └── open(worker_id) → Shift { status: Open }                │
//! │         (fails ShiftAlreadyOpen if one is open anywhere;        │
//! │          a partial unique index makes the rule atomic)          │
//! │                                                                 │
//! │  2. WORK                                                        │
//! │     ├── record_sale() → bar stock -= units + Sale row           │
//! │     └── record_loan() → Loan row                                │
//! │                                                                 │
//! │  3. CLOSE (terminal)                                            │
//! │     └── close() → recompute totals from the rows,               │
//! │                   freeze summary on the shift,                  │
//! │                   write WorkerSettlement,                       │
//! │                   cash in gross revenue, cash out net pay       │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation re-reads the open shift inside its own transaction;
//! "there is an open shift" is never taken from a cache.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::{DbError, DbResult};
use crate::repository::{cashflow, product, stock, worker};
use cantina_core::validation::{validate_amount, validate_description, validate_quantity};
use cantina_core::{
    summarize_shift, CoreError, EntryType, Loan, Money, Sale, Shift, ShiftStatus, StockLocation,
    WorkerSettlement,
};

const SHIFT_COLUMNS: &str = "id, worker_id, worker_name, base_pay, status, opened_at, \
     closed_at, gross_revenue, token_earnings, loans_total, net_payable";

const SALE_COLUMNS: &str = "id, shift_id, product_id, product_name, units, \
     unit_sale_price, unit_token_price, total_sale, total_tokens, created_at";

/// Repository for the shift engine.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        ShiftRepository { pool, notifier }
    }

    /// Opens a shift for a worker, snapshotting name and base pay.
    ///
    /// Only one shift may be open system-wide. The check runs inside the
    /// insert's transaction and the partial unique index on open shifts
    /// backstops it, so two racing opens cannot both succeed.
    pub async fn open(&self, worker_id: &str) -> DbResult<Shift> {
        let worker = worker::require(&self.pool, worker_id).await?;

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            worker_id: worker.id.clone(),
            worker_name: worker.name.clone(),
            base_pay: worker.base_pay,
            status: ShiftStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            gross_revenue: None,
            token_earnings: None,
            loans_total: None,
            net_payable: None,
        };

        debug!(shift_id = %shift.id, worker = %shift.worker_name, "Opening shift");

        let mut tx = self.pool.begin().await?;

        if open_shift_id(&mut tx).await?.is_some() {
            return Err(CoreError::ShiftAlreadyOpen.into());
        }

        sqlx::query(
            "INSERT INTO shifts (id, worker_id, worker_name, base_pay, status, opened_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&shift.id)
        .bind(&shift.worker_id)
        .bind(&shift.worker_name)
        .bind(shift.base_pay)
        .bind(shift.status)
        .bind(shift.opened_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // The unique index on open shifts lost a race.
            DbError::UniqueViolation { .. } => DbError::Domain(CoreError::ShiftAlreadyOpen),
            other => other,
        })?;

        tx.commit().await?;

        self.notifier.publish(Collection::Shifts);

        Ok(shift)
    }

    /// The currently open shift, if any.
    pub async fn active(&self) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE status = 'open' LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Gets a shift by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Records a sale during the open shift.
    ///
    /// Atomically: checks the shift is open, debits bar stock (guarded), and
    /// appends the sale row with price snapshots. `InsufficientStock` aborts
    /// everything: no stock change and no sale row.
    pub async fn record_sale(&self, product_id: &str, units: i64) -> DbResult<Sale> {
        validate_quantity(units).map_err(CoreError::from)?;
        let product = product::require(&self.pool, product_id).await?;

        let mut tx = self.pool.begin().await?;

        let Some(shift_id) = open_shift_id(&mut tx).await? else {
            return Err(CoreError::ShiftNotOpen.into());
        };

        stock::adjust(&mut tx, product_id, StockLocation::Bar, -units).await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            shift_id,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            units,
            unit_sale_price: product.sale_price,
            unit_token_price: product.token_price,
            total_sale: product.sale_price().multiply_units(units).pesos(),
            total_tokens: product.token_price().multiply_units(units).pesos(),
            created_at: Utc::now(),
        };

        debug!(
            shift_id = %sale.shift_id,
            product = %sale.product_name,
            units = %units,
            total_sale = %sale.total_sale,
            "Recording sale"
        );

        sqlx::query(&format!(
            "INSERT INTO shift_sales ({SALE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&sale.id)
        .bind(&sale.shift_id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(sale.units)
        .bind(sale.unit_sale_price)
        .bind(sale.unit_token_price)
        .bind(sale.total_sale)
        .bind(sale.total_tokens)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notifier
            .publish_all(&[Collection::ShiftSales, Collection::StockLevels]);

        Ok(sale)
    }

    /// Records a loan (cash advance) against the open shift.
    ///
    /// No guard against borrowing more than earned: the shortfall surfaces
    /// as negative net payable at close.
    pub async fn record_loan(&self, description: &str, amount: Money) -> DbResult<Loan> {
        validate_description(description).map_err(CoreError::from)?;
        validate_amount(amount.pesos()).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let Some(shift_id) = open_shift_id(&mut tx).await? else {
            return Err(CoreError::ShiftNotOpen.into());
        };

        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            shift_id,
            description: description.trim().to_string(),
            amount: amount.pesos(),
            created_at: Utc::now(),
        };

        debug!(shift_id = %loan.shift_id, amount = %amount, "Recording loan");

        sqlx::query(
            "INSERT INTO shift_loans (id, shift_id, description, amount, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&loan.id)
        .bind(&loan.shift_id)
        .bind(&loan.description)
        .bind(loan.amount)
        .bind(loan.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notifier.publish(Collection::ShiftLoans);

        Ok(loan)
    }

    /// Closes the open shift and settles the worker.
    ///
    /// ## What This Does (one transaction)
    /// 1. Re-reads the open shift and ALL of its sale/loan rows
    /// 2. Recomputes the summary from those rows
    /// 3. Freezes the summary on the shift and marks it closed
    /// 4. Writes the WorkerSettlement (one per shift, ever)
    /// 5. Cashes in gross revenue and cashes out net pay, when positive
    ///
    /// A second close finds no open shift and fails with `ShiftNotOpen`;
    /// the unique `shift_id` on worker_settlements backstops the rule.
    pub async fn close(&self) -> DbResult<WorkerSettlement> {
        let mut tx = self.pool.begin().await?;

        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE status = 'open' LIMIT 1"
        ))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(shift) = shift else {
            return Err(CoreError::ShiftNotOpen.into());
        };

        let sales = sales_for(&mut tx, &shift.id).await?;
        let loans = loans_for(&mut tx, &shift.id).await?;

        let summary = summarize_shift(Money::from_pesos(shift.base_pay), &sales, &loans);
        let now = Utc::now();

        debug!(
            shift_id = %shift.id,
            worker = %shift.worker_name,
            gross_revenue = %summary.gross_revenue,
            net_payable = %summary.net_payable,
            "Closing shift"
        );

        let result = sqlx::query(
            "UPDATE shifts SET status = 'closed', closed_at = ?, gross_revenue = ?, \
                 token_earnings = ?, loans_total = ?, net_payable = ? \
             WHERE id = ? AND status = 'open'",
        )
        .bind(now)
        .bind(summary.gross_revenue.pesos())
        .bind(summary.token_earnings.pesos())
        .bind(summary.loans_total.pesos())
        .bind(summary.net_payable.pesos())
        .bind(&shift.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ShiftNotOpen.into());
        }

        let settlement = WorkerSettlement {
            id: Uuid::new_v4().to_string(),
            shift_id: shift.id.clone(),
            worker_id: shift.worker_id.clone(),
            worker_name: shift.worker_name.clone(),
            gross_revenue: summary.gross_revenue.pesos(),
            token_earnings: summary.token_earnings.pesos(),
            loans_total: summary.loans_total.pesos(),
            base_pay: summary.base_pay.pesos(),
            net_payable: summary.net_payable.pesos(),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO worker_settlements \
                 (id, shift_id, worker_id, worker_name, gross_revenue, token_earnings, \
                  loans_total, base_pay, net_payable, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&settlement.id)
        .bind(&settlement.shift_id)
        .bind(&settlement.worker_id)
        .bind(&settlement.worker_name)
        .bind(settlement.gross_revenue)
        .bind(settlement.token_earnings)
        .bind(settlement.loans_total)
        .bind(settlement.base_pay)
        .bind(settlement.net_payable)
        .bind(settlement.created_at)
        .execute(&mut *tx)
        .await?;

        if summary.gross_revenue.is_positive() {
            let entry = cashflow::new_entry(
                EntryType::Income,
                summary.gross_revenue,
                format!("Shift close: {}", shift.worker_name),
            );
            cashflow::append_entry(&mut tx, &entry).await?;
        }

        if summary.net_payable.is_positive() {
            let entry = cashflow::new_entry(
                EntryType::Expense,
                summary.net_payable,
                format!("Shift payout: {}", shift.worker_name),
            );
            cashflow::append_entry(&mut tx, &entry).await?;
        }

        tx.commit().await?;

        self.notifier.publish_all(&[
            Collection::Shifts,
            Collection::WorkerSettlements,
            Collection::Cashflow,
        ]);

        Ok(settlement)
    }

    /// Sales recorded for a shift, oldest first.
    pub async fn sales(&self, shift_id: &str) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        sales_for(&mut conn, shift_id).await
    }

    /// Loans recorded for a shift, oldest first.
    pub async fn loans(&self, shift_id: &str) -> DbResult<Vec<Loan>> {
        let mut conn = self.pool.acquire().await?;
        loans_for(&mut conn, shift_id).await
    }

    /// Worker settlements, newest first.
    pub async fn settlements(&self, limit: u32) -> DbResult<Vec<WorkerSettlement>> {
        let settlements = sqlx::query_as::<_, WorkerSettlement>(
            "SELECT id, shift_id, worker_id, worker_name, gross_revenue, token_earnings, \
                 loans_total, base_pay, net_payable, created_at \
             FROM worker_settlements ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }
}

/// The open shift's id, read on the given connection (inside the caller's
/// transaction).
async fn open_shift_id(conn: &mut SqliteConnection) -> DbResult<Option<String>> {
    let id: Option<String> =
        sqlx::query_scalar("SELECT id FROM shifts WHERE status = 'open' LIMIT 1")
            .fetch_optional(&mut *conn)
            .await?;

    Ok(id)
}

async fn sales_for(conn: &mut SqliteConnection, shift_id: &str) -> DbResult<Vec<Sale>> {
    let sales = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM shift_sales WHERE shift_id = ? ORDER BY created_at"
    ))
    .bind(shift_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

async fn loans_for(conn: &mut SqliteConnection, shift_id: &str) -> DbResult<Vec<Loan>> {
    let loans = sqlx::query_as::<_, Loan>(
        "SELECT id, shift_id, description, amount, created_at \
         FROM shift_loans WHERE shift_id = ? ORDER BY created_at",
    )
    .bind(shift_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(loans)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use cantina_core::{Product, PurchaseUnit, SettlementType, Worker};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_worker(db: &Database, base_pay: i64) -> Worker {
        db.workers()
            .create("Ana", Money::from_pesos(base_pay))
            .await
            .unwrap()
    }

    /// A product selling at 3.500 with a 500 token price, with `bar_units`
    /// already on the bar shelf.
    async fn seeded_product(db: &Database, bar_units: i64) -> Product {
        let provider = db.providers().create("Bavaria", None, true).await.unwrap();
        let product = db
            .products()
            .create(NewProduct {
                name: "Aguila 330ml".into(),
                sale_price: 3_500,
                purchase_cost: 2_000,
                token_price: 500,
                units_per_box: 24,
                units_per_basket: 30,
            })
            .await
            .unwrap();

        if bar_units > 0 {
            db.purchases()
                .record(
                    &provider.id,
                    &product.id,
                    bar_units,
                    PurchaseUnit::Each,
                    SettlementType::Consignment,
                )
                .await
                .unwrap();
            db.stock()
                .transfer_to_bar(&product.id, bar_units, PurchaseUnit::Each)
                .await
                .unwrap();
        }

        product
    }

    async fn bar_units(db: &Database, product_id: &str) -> i64 {
        db.stock()
            .level(product_id, StockLocation::Bar)
            .await
            .unwrap()
            .unwrap()
            .units
    }

    #[tokio::test]
    async fn test_open_snapshots_worker() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;

        let shift = db.shifts().open(&worker.id).await.unwrap();
        assert_eq!(shift.status, ShiftStatus::Open);
        assert_eq!(shift.worker_name, "Ana");
        assert_eq!(shift.base_pay, 30_000);

        let active = db.shifts().active().await.unwrap().unwrap();
        assert_eq!(active.id, shift.id);
    }

    #[tokio::test]
    async fn test_only_one_open_shift() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        db.shifts().open(&worker.id).await.unwrap();

        let err = db.shifts().open(&worker.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ShiftAlreadyOpen)
        ));
    }

    #[tokio::test]
    async fn test_sale_requires_open_shift() {
        let db = test_db().await;
        let product = seeded_product(&db, 10).await;

        let err = db.shifts().record_sale(&product.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftNotOpen)));
        assert_eq!(bar_units(&db, &product.id).await, 10);
    }

    #[tokio::test]
    async fn test_sale_debits_bar_and_snapshots_prices() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        let product = seeded_product(&db, 10).await;
        db.shifts().open(&worker.id).await.unwrap();

        let sale = db.shifts().record_sale(&product.id, 4).await.unwrap();

        assert_eq!(sale.units, 4);
        assert_eq!(sale.unit_sale_price, 3_500);
        assert_eq!(sale.total_sale, 14_000);
        assert_eq!(sale.total_tokens, 2_000);
        assert_eq!(bar_units(&db, &product.id).await, 6);
    }

    #[tokio::test]
    async fn test_oversell_aborts_whole_sale() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        let product = seeded_product(&db, 5).await;
        let shift = db.shifts().open(&worker.id).await.unwrap();

        let err = db.shifts().record_sale(&product.id, 10).await.unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                location,
                available,
                requested,
            }) => {
                assert_eq!(location, StockLocation::Bar);
                assert_eq!(available, 5);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Stock untouched, no sale row written.
        assert_eq!(bar_units(&db, &product.id).await, 5);
        assert!(db.shifts().sales(&shift.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loan_requires_open_shift_and_valid_input() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;

        let err = db
            .shifts()
            .record_loan("advance", Money::from_pesos(2_000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftNotOpen)));

        db.shifts().open(&worker.id).await.unwrap();

        assert!(db
            .shifts()
            .record_loan("", Money::from_pesos(2_000))
            .await
            .is_err());
        assert!(db.shifts().record_loan("advance", Money::zero()).await.is_err());

        let loan = db
            .shifts()
            .record_loan("advance", Money::from_pesos(2_000))
            .await
            .unwrap();
        assert_eq!(loan.amount, 2_000);
    }

    #[tokio::test]
    async fn test_close_settles_and_moves_cash() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        let product = seeded_product(&db, 20).await;
        let shift = db.shifts().open(&worker.id).await.unwrap();

        // One sale of 10 units: gross 35.000, tokens 5.000. One 2.000 loan.
        db.shifts().record_sale(&product.id, 10).await.unwrap();
        db.shifts()
            .record_loan("advance", Money::from_pesos(2_000))
            .await
            .unwrap();

        let balance_before = db.cashflow().current_balance().await.unwrap();
        let settlement = db.shifts().close().await.unwrap();

        assert_eq!(settlement.gross_revenue, 35_000);
        assert_eq!(settlement.token_earnings, 5_000);
        assert_eq!(settlement.loans_total, 2_000);
        assert_eq!(settlement.base_pay, 30_000);
        // 30.000 + 5.000 - 2.000
        assert_eq!(settlement.net_payable, 33_000);

        let closed = db.shifts().get(&shift.id).await.unwrap().unwrap();
        assert_eq!(closed.status, ShiftStatus::Closed);
        assert!(closed.closed_at.is_some());
        let summary = closed.summary().unwrap();
        assert_eq!(summary.net_payable.pesos(), 33_000);

        // Income 35.000, expense 33.000: balance moves by +2.000.
        let entries = db.cashflow().recent(10).await.unwrap();
        assert!(entries
            .iter()
            .any(|e| e.entry_type == EntryType::Income && e.amount == 35_000));
        assert!(entries
            .iter()
            .any(|e| e.entry_type == EntryType::Expense && e.amount == 33_000));
        assert_eq!(
            db.cashflow().current_balance().await.unwrap(),
            balance_before + Money::from_pesos(2_000)
        );

        assert!(db.shifts().active().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_twice_fails_without_duplicate_settlement() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        db.shifts().open(&worker.id).await.unwrap();

        db.shifts().close().await.unwrap();
        let err = db.shifts().close().await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftNotOpen)));

        assert_eq!(db.shifts().settlements(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_empty_shift_pays_base_only() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 25_000).await;
        db.shifts().open(&worker.id).await.unwrap();

        let settlement = db.shifts().close().await.unwrap();
        assert_eq!(settlement.gross_revenue, 0);
        assert_eq!(settlement.net_payable, 25_000);

        // No revenue: no income entry, only the payout expense.
        let entries = db.cashflow().list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Expense);
        assert_eq!(entries[0].amount, 25_000);
    }

    #[tokio::test]
    async fn test_close_with_negative_net_emits_no_payout() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 0).await;
        db.shifts().open(&worker.id).await.unwrap();
        db.shifts()
            .record_loan("big advance", Money::from_pesos(10_000))
            .await
            .unwrap();

        let settlement = db.shifts().close().await.unwrap();
        assert_eq!(settlement.net_payable, -10_000);

        // Nothing positive to move: the cash ledger stays empty.
        assert!(db.cashflow().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_shift_is_unreachable_then_new_shift_can_open() {
        let db = test_db().await;
        let worker = seeded_worker(&db, 30_000).await;
        let product = seeded_product(&db, 10).await;

        db.shifts().open(&worker.id).await.unwrap();
        db.shifts().close().await.unwrap();

        let err = db.shifts().record_sale(&product.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftNotOpen)));

        // The terminal state frees the singleton slot.
        let second = db.shifts().open(&worker.id).await.unwrap();
        assert_eq!(second.status, ShiftStatus::Open);
    }
}
