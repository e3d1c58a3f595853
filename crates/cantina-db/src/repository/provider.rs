//! # Provider Repository
//!
//! Suppliers and their payable balances.
//!
//! ## Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  settle(provider_id)                    ONE transaction         │
//! │                                                                 │
//! │  1. re-read pending_balance  ── 0 or less → NothingToSettle     │
//! │  2. write ProviderSettlement(amount = balance)                  │
//! │  3. reset pending_balance to 0 (guarded on the read value)      │
//! │  4. append CashflowEntry(expense, balance) + move the counter   │
//! │                                                                 │
//! │  A consignment purchase that lands between the read and the     │
//! │  reset fails the guard and the settlement aborts whole.         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::{DbError, DbResult};
use crate::repository::cashflow;
use cantina_core::validation::validate_name;
use cantina_core::{CoreError, EntryType, Money, Provider, ProviderSettlement};

const PROVIDER_COLUMNS: &str =
    "id, name, contact, accepts_consignment, pending_balance, created_at, updated_at";

/// Repository for provider operations.
#[derive(Debug, Clone)]
pub struct ProviderRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl ProviderRepository {
    /// Creates a new ProviderRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        ProviderRepository { pool, notifier }
    }

    /// Creates a provider with a zero pending balance.
    pub async fn create(
        &self,
        name: &str,
        contact: Option<String>,
        accepts_consignment: bool,
    ) -> DbResult<Provider> {
        validate_name("name", name).map_err(CoreError::from)?;

        let now = Utc::now();
        let provider = Provider {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            contact,
            accepts_consignment,
            pending_balance: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %provider.id, name = %provider.name, "Creating provider");

        sqlx::query(
            "INSERT INTO providers \
                 (id, name, contact, accepts_consignment, pending_balance, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&provider.id)
        .bind(&provider.name)
        .bind(&provider.contact)
        .bind(provider.accepts_consignment)
        .bind(provider.pending_balance)
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .execute(&self.pool)
        .await?;

        self.notifier.publish(Collection::Providers);

        Ok(provider)
    }

    /// Updates a provider's contact data and consignment flag.
    ///
    /// The pending balance is ledger-owned: only the purchase recorder
    /// credits it and only settlement resets it. Admin edits cannot touch it.
    pub async fn update(&self, provider: &Provider) -> DbResult<()> {
        validate_name("name", &provider.name).map_err(CoreError::from)?;

        debug!(id = %provider.id, "Updating provider");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE providers SET name = ?, contact = ?, accepts_consignment = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&provider.name)
        .bind(&provider.contact)
        .bind(provider.accepts_consignment)
        .bind(now)
        .bind(&provider.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProviderNotFound(provider.id.clone()).into());
        }

        self.notifier.publish(Collection::Providers);

        Ok(())
    }

    /// Gets a provider by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Provider>> {
        let provider = sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    /// Gets a provider by ID, failing when it does not exist.
    pub async fn require(&self, id: &str) -> DbResult<Provider> {
        require(&self.pool, id).await
    }

    /// Lists providers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Provider>> {
        let providers = sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    /// Total money owed to providers (dashboard derived view).
    pub async fn total_pending(&self) -> DbResult<Money> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(pending_balance) FROM providers")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_pesos(total.unwrap_or(0)))
    }

    /// Pays off a provider's pending balance.
    ///
    /// Atomically: writes the settlement record, zeroes the balance, and
    /// appends the cash expense. Fails with `NothingToSettle` when the
    /// balance is zero or negative; calling it twice settles once.
    pub async fn settle(&self, provider_id: &str) -> DbResult<ProviderSettlement> {
        let mut tx = self.pool.begin().await?;

        // Authoritative re-read; never the caller's cached balance.
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, pending_balance FROM providers WHERE id = ?")
                .bind(provider_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((name, pending_balance)) = row else {
            return Err(CoreError::ProviderNotFound(provider_id.to_string()).into());
        };

        if pending_balance <= 0 {
            return Err(CoreError::NothingToSettle(provider_id.to_string()).into());
        }

        debug!(provider_id = %provider_id, amount = %pending_balance, "Settling provider");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE providers SET pending_balance = 0, updated_at = ? \
             WHERE id = ? AND pending_balance = ?",
        )
        .bind(now)
        .bind(provider_id)
        .bind(pending_balance)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionConflict);
        }

        let settlement = ProviderSettlement {
            id: Uuid::new_v4().to_string(),
            provider_id: provider_id.to_string(),
            amount_paid: pending_balance,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO provider_settlements (id, provider_id, amount_paid, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&settlement.id)
        .bind(&settlement.provider_id)
        .bind(settlement.amount_paid)
        .bind(settlement.created_at)
        .execute(&mut *tx)
        .await?;

        let entry = cashflow::new_entry(
            EntryType::Expense,
            Money::from_pesos(pending_balance),
            format!("Provider settlement: {name}"),
        );
        cashflow::append_entry(&mut tx, &entry).await?;

        tx.commit().await?;

        self.notifier.publish_all(&[
            Collection::Providers,
            Collection::ProviderSettlements,
            Collection::Cashflow,
        ]);

        Ok(settlement)
    }

    /// Lists settlements for one provider, newest first.
    pub async fn settlements(&self, provider_id: &str) -> DbResult<Vec<ProviderSettlement>> {
        let settlements = sqlx::query_as::<_, ProviderSettlement>(
            "SELECT id, provider_id, amount_paid, created_at \
             FROM provider_settlements WHERE provider_id = ? ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(settlements)
    }
}

/// Resolves a provider id or fails with `ProviderNotFound`.
pub(crate) async fn require(pool: &SqlitePool, id: &str) -> DbResult<Provider> {
    let provider = sqlx::query_as::<_, Provider>(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    provider.ok_or_else(|| CoreError::ProviderNotFound(id.to_string()).into())
}

/// Credits a provider's payable balance inside an enclosing transaction
/// (consignment purchases).
pub(crate) async fn credit_balance(
    conn: &mut SqliteConnection,
    provider_id: &str,
    amount: Money,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE providers SET pending_balance = pending_balance + ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(amount.pesos())
    .bind(now)
    .bind(provider_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::ProviderNotFound(provider_id.to_string()).into());
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn credit(db: &Database, provider_id: &str, pesos: i64) {
        let mut tx = db.pool().begin().await.unwrap();
        credit_balance(&mut tx, provider_id, Money::from_pesos(pesos))
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let db = test_db().await;
        let providers = db.providers();

        let mut provider = providers
            .create("Bavaria", Some("311 555 0101".into()), true)
            .await
            .unwrap();
        assert_eq!(provider.pending_balance, 0);

        provider.contact = None;
        provider.accepts_consignment = false;
        providers.update(&provider).await.unwrap();

        let reloaded = providers.get(&provider.id).await.unwrap().unwrap();
        assert!(reloaded.contact.is_none());
        assert!(!reloaded.accepts_consignment);
    }

    #[tokio::test]
    async fn test_settle_zeroes_balance_and_records_expense() {
        let db = test_db().await;
        let provider = db.providers().create("Bavaria", None, true).await.unwrap();
        credit(&db, &provider.id, 96_000).await;

        let settlement = db.providers().settle(&provider.id).await.unwrap();
        assert_eq!(settlement.amount_paid, 96_000);

        let reloaded = db.providers().get(&provider.id).await.unwrap().unwrap();
        assert_eq!(reloaded.pending_balance, 0);

        let settlements = db.providers().settlements(&provider.id).await.unwrap();
        assert_eq!(settlements.len(), 1);

        let entries = db.cashflow().list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Expense);
        assert_eq!(entries[0].amount, 96_000);
        assert_eq!(
            db.cashflow().current_balance().await.unwrap(),
            Money::from_pesos(-96_000)
        );
    }

    #[tokio::test]
    async fn test_settle_twice_fails_second_time() {
        let db = test_db().await;
        let provider = db.providers().create("Bavaria", None, true).await.unwrap();
        credit(&db, &provider.id, 96_000).await;

        db.providers().settle(&provider.id).await.unwrap();
        let err = db.providers().settle(&provider.id).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::NothingToSettle(_))
        ));

        // Still exactly one settlement and one expense.
        assert_eq!(
            db.providers().settlements(&provider.id).await.unwrap().len(),
            1
        );
        assert_eq!(db.cashflow().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_with_zero_balance_fails() {
        let db = test_db().await;
        let provider = db.providers().create("Bavaria", None, false).await.unwrap();

        let err = db.providers().settle(&provider.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NothingToSettle(_))
        ));
    }

    #[tokio::test]
    async fn test_total_pending_sums_providers() {
        let db = test_db().await;
        let a = db.providers().create("Bavaria", None, true).await.unwrap();
        let b = db.providers().create("Postobon", None, true).await.unwrap();
        credit(&db, &a.id, 96_000).await;
        credit(&db, &b.id, 4_000).await;

        assert_eq!(
            db.providers().total_pending().await.unwrap(),
            Money::from_pesos(100_000)
        );
    }
}
