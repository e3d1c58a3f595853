//! # Worker Repository
//!
//! Workers and their base pay. The shift engine snapshots name and base pay
//! at open time, so later edits never change a running or closed shift.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::changes::{ChangeNotifier, Collection};
use crate::error::DbResult;
use cantina_core::validation::{validate_name, validate_price};
use cantina_core::{CoreError, Money, Worker};

const WORKER_COLUMNS: &str = "id, name, base_pay, is_active, created_at, updated_at";

/// Repository for worker operations.
#[derive(Debug, Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl WorkerRepository {
    /// Creates a new WorkerRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        WorkerRepository { pool, notifier }
    }

    /// Creates an active worker.
    pub async fn create(&self, name: &str, base_pay: Money) -> DbResult<Worker> {
        validate_name("name", name).map_err(CoreError::from)?;
        validate_price("base_pay", base_pay.pesos()).map_err(CoreError::from)?;

        let now = Utc::now();
        let worker = Worker {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            base_pay: base_pay.pesos(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %worker.id, name = %worker.name, "Creating worker");

        sqlx::query(
            "INSERT INTO workers (id, name, base_pay, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(worker.base_pay)
        .bind(worker.is_active)
        .bind(worker.created_at)
        .bind(worker.updated_at)
        .execute(&self.pool)
        .await?;

        self.notifier.publish(Collection::Workers);

        Ok(worker)
    }

    /// Updates a worker's name, base pay, and active flag.
    pub async fn update(&self, worker: &Worker) -> DbResult<()> {
        validate_name("name", &worker.name).map_err(CoreError::from)?;
        validate_price("base_pay", worker.base_pay).map_err(CoreError::from)?;

        debug!(id = %worker.id, "Updating worker");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE workers SET name = ?, base_pay = ?, is_active = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&worker.name)
        .bind(worker.base_pay)
        .bind(worker.is_active)
        .bind(now)
        .bind(&worker.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::WorkerNotFound(worker.id.clone()).into());
        }

        self.notifier.publish(Collection::Workers);

        Ok(())
    }

    /// Gets a worker by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Worker>> {
        let worker = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(worker)
    }

    /// Gets a worker by ID, failing when it does not exist.
    pub async fn require(&self, id: &str) -> DbResult<Worker> {
        require(&self.pool, id).await
    }

    /// Lists active workers sorted by name (the open-shift picker).
    pub async fn list_active(&self) -> DbResult<Vec<Worker>> {
        let workers = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(workers)
    }

    /// Lists all workers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Worker>> {
        let workers = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(workers)
    }
}

/// Resolves a worker id or fails with `WorkerNotFound`.
pub(crate) async fn require(pool: &SqlitePool, id: &str) -> DbResult<Worker> {
    let worker = sqlx::query_as::<_, Worker>(&format!(
        "SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    worker.ok_or_else(|| CoreError::WorkerNotFound(id.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::DbError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let workers = db.workers();

        workers
            .create("Ana", Money::from_pesos(30_000))
            .await
            .unwrap();
        let mut carlos = workers.create("Carlos", Money::zero()).await.unwrap();

        assert_eq!(workers.list_active().await.unwrap().len(), 2);

        carlos.is_active = false;
        workers.update(&carlos).await.unwrap();

        assert_eq!(workers.list_active().await.unwrap().len(), 1);
        assert_eq!(workers.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_require_unknown_worker_fails() {
        let db = test_db().await;

        let err = db
            .workers()
            .require("11111111-1111-1111-1111-111111111111")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::WorkerNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_base_pay() {
        let db = test_db().await;
        assert!(db
            .workers()
            .create("Ana", Money::from_pesos(-1))
            .await
            .is_err());
    }
}
