//! Error types for repsheet

use thiserror::Error;

/// Core error type for repsheet operations
#[derive(Error, Debug)]
pub enum RepsheetError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Workout not found
    #[error("Workout not found: {id}")]
    WorkoutNotFound { id: i64 },

    /// User not found
    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    /// Desired position outside the valid range for the owner's list
    #[error("Invalid position {position}: expected {min}..={max}")]
    InvalidPosition { position: i32, min: i32, max: i32 },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepsheetError {
    /// Whether the same call may succeed if issued again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(DatabaseError::Conflict(_)) | Self::Database(DatabaseError::Timeout)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WorkoutNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::Database(DatabaseError::NotFound)
        )
    }
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timed out waiting for the store")]
    Timeout,
}

/// PostgreSQL serialization failure / deadlock and SQLite busy / locked codes
fn is_conflict_code(code: &str) -> bool {
    matches!(code, "40001" | "40P01" | "5" | "6" | "261" | "262" | "517")
}

/// PostgreSQL lock_not_available (`lock_timeout`) and query_canceled
/// (`statement_timeout`)
fn is_timeout_code(code: &str) -> bool {
    matches!(code, "55P03" | "57014")
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
                if is_conflict_code(&code) {
                    return Self::Conflict(db_err.message().to_string());
                }
                if is_timeout_code(&code) {
                    return Self::Timeout;
                }
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation => {
                        Self::Constraint(db_err.message().to_string())
                    }
                    _ => Self::Query(db_err.message().to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => Self::Timeout,
            sqlx::Error::PoolClosed => Self::Connection("Pool closed".to_string()),
            sqlx::Error::Io(e) => Self::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Self::Connection(e.to_string()),
            sqlx::Error::Migrate(e) => Self::Migration(e.to_string()),
            _ => Self::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for RepsheetError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.into())
    }
}

/// Result type alias for repsheet operations
pub type Result<T> = std::result::Result<T, RepsheetError>;
