//! Database errors and their mapping onto storage-contract errors.

use tillage_core::StoreError;

/// Database operation errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Failed to connect: {0}")]
    ConnectFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Schema initialisation failed: {0}")]
    SchemaFailed(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),
}

impl DbError {
    /// Classify a raw sqlx error.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::UniqueViolation(db.message().to_string())
            }
            _ => DbError::QueryFailed(err.to_string()),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => StoreError::Conflict(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
