//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Error Propagation                           │
//! │                                                                 │
//! │  SQLite Error (sqlx::Error)                                     │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  DbError (this module) ← adds context and categorization        │
//! │       │                                                         │
//! │       │    Domain failures (insufficient stock, shift already   │
//! │       │    open, nothing to settle) travel the same channel as  │
//! │       │    DbError::Domain, raised from inside the transaction  │
//! │       │    that detected them.                                  │
//! │       ▼                                                         │
//! │  Caller (view layer) maps to a user-facing message              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lock conflict that SQLite cannot resolve within the busy timeout maps
//! to [`DbError::TransactionConflict`] - the only retryable variant. The
//! engine never retries on its own; callers decide.

use thiserror::Error;

use cantina_core::CoreError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context for
/// debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// A business rule rejected the operation.
    ///
    /// The enclosing transaction was rolled back; no state changed.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a product/provider/worker id that was never created
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A concurrent writer held or took the database lock and the operation
    /// could not commit. Retryable: re-running the operation re-reads fresh
    /// state and may succeed.
    #[error("transaction conflict: a concurrent write won, retry the operation")]
    TransactionConflict,

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::TransactionConflict)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound     → DbError::NotFound
/// sqlx::Error::Database        → analyze message for constraint / lock
/// sqlx::Error::PoolTimedOut    → DbError::PoolExhausted
/// Other                        → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages for the cases we care about:
                //   "database is locked"            (SQLITE_BUSY)
                //   "database table is locked"      (SQLITE_LOCKED)
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                if msg.contains("database is locked") || msg.contains("database table is locked") {
                    DbError::TransactionConflict
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(DbError::TransactionConflict.is_retryable());
        assert!(!DbError::not_found("Product", "x").is_retryable());
        assert!(!DbError::Domain(CoreError::ShiftAlreadyOpen).is_retryable());
    }

    #[test]
    fn test_domain_error_message_passthrough() {
        let err = DbError::Domain(CoreError::NothingToSettle("prov-1".into()));
        assert_eq!(
            err.to_string(),
            "provider prov-1 has no pending balance to settle"
        );
    }
}
