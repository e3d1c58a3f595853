//! # Cash Ledger Repository
//!
//! Append-only cash movements plus the running balance.
//!
//! ## Balance vs. Display Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  cashflow_entries   append-only history                         │
//! │  cash_balance       singleton counter, updated in the SAME      │
//! │                     transaction as every append                 │
//! │                                                                 │
//! │  current_balance()  reads the counter: exact over full history  │
//! │  recent(50)         reads the window:  display only             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Summing a bounded window would drift from the true balance as soon as an
//! entry falls out of it; the counter keeps "balance" and "recent history"
//! as two separate answers.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::DbResult;
use cantina_core::validation::{validate_amount, validate_description};
use cantina_core::{CashflowEntry, CoreError, EntryType, Money};

/// Repository for the cash ledger.
#[derive(Debug, Clone)]
pub struct CashflowRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl CashflowRepository {
    /// Creates a new CashflowRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        CashflowRepository { pool, notifier }
    }

    /// Records a manual cash movement (e.g. rent, a cash count correction).
    ///
    /// Carries `is_manual` and the acting user's id; derived movements
    /// (purchases, settlements, shift close) are written by their own
    /// recorders and never through this entry point.
    pub async fn record_manual(
        &self,
        entry_type: EntryType,
        amount: Money,
        description: &str,
        recorded_by: &str,
    ) -> DbResult<CashflowEntry> {
        validate_amount(amount.pesos()).map_err(CoreError::from)?;
        validate_description(description).map_err(CoreError::from)?;

        let mut entry = new_entry(entry_type, amount, description.trim().to_string());
        entry.is_manual = true;
        entry.recorded_by = Some(recorded_by.to_string());

        debug!(entry_type = ?entry_type, amount = %amount, "Recording manual cash movement");

        let mut tx = self.pool.begin().await?;
        append_entry(&mut tx, &entry).await?;
        tx.commit().await?;

        self.notifier.publish(Collection::Cashflow);

        Ok(entry)
    }

    /// The exact cash balance: signed sum over the full history, read from
    /// the transactionally-maintained counter.
    pub async fn current_balance(&self) -> DbResult<Money> {
        let balance: i64 = sqlx::query_scalar("SELECT balance FROM cash_balance WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_pesos(balance))
    }

    /// The most recent entries, newest first (display window).
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<CashflowEntry>> {
        let entries = sqlx::query_as::<_, CashflowEntry>(
            "SELECT id, entry_type, amount, description, is_manual, recorded_by, created_at \
             FROM cashflow_entries ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every entry, oldest first. For exports and tests.
    pub async fn list_all(&self) -> DbResult<Vec<CashflowEntry>> {
        let entries = sqlx::query_as::<_, CashflowEntry>(
            "SELECT id, entry_type, amount, description, is_manual, recorded_by, created_at \
             FROM cashflow_entries ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

/// Builds a derived (non-manual) entry.
pub(crate) fn new_entry(entry_type: EntryType, amount: Money, description: String) -> CashflowEntry {
    CashflowEntry {
        id: Uuid::new_v4().to_string(),
        entry_type,
        amount: amount.pesos(),
        description,
        is_manual: false,
        recorded_by: None,
        created_at: Utc::now(),
    }
}

/// Appends one entry and moves the running balance, inside the caller's
/// transaction. Both writes commit together with whatever else the caller
/// has staged (a purchase, a settlement, a shift close).
pub(crate) async fn append_entry(conn: &mut SqliteConnection, entry: &CashflowEntry) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO cashflow_entries \
             (id, entry_type, amount, description, is_manual, recorded_by, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(entry.entry_type)
    .bind(entry.amount)
    .bind(&entry.description)
    .bind(entry.is_manual)
    .bind(&entry.recorded_by)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE cash_balance SET balance = balance + ? WHERE id = 1")
        .bind(entry.signed_amount().pesos())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
