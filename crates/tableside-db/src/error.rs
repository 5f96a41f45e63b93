//! # Database Error Types
//!
//! Error types for store operations and for the table-session manager.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       │           CoreError (NotFound / Expired / InvalidTransition)   │
//! │       │                │                                                │
//! │       ▼                ▼                                                │
//! │  ManagerError::Store   ManagerError::Core                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Transport layer (not retried here)                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tableside_core::{CoreError, ErrorKind, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// Constraint failures are classified so callers can tell a duplicate table
/// number from a broken invariant; everything else keeps sqlx's message.
#[derive(Debug, Error)]
pub enum DbError {
    /// A `fetch_one` found no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Provisioning a table with a number already in use
    /// - Importing a code that another table already carries
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating a session for a table id that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - Writing `occupied` without a session, or a session without `occupied`
    /// - Status outside available / occupied / cleaning
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// The write lock stayed taken for longer than `busy_timeout`.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure, including immutability triggers.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// An atomic operation could not complete.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No pooled connection became free within `acquire_timeout`.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

// SQLITE_BUSY and SQLITE_BUSY_SNAPSHOT
const SQLITE_BUSY_CODES: [&str; 2] = ["5", "517"];

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// RowNotFound                        → NotFound
/// Database (unique / fk / check)     → UniqueViolation / ForeignKeyViolation / CheckViolation
/// Database (SQLITE_BUSY)             → Busy
/// Database (other)                   → QueryFailed
/// PoolTimedOut / PoolClosed          → PoolExhausted / ConnectionFailed
/// Other                              → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind as SqlxKind;

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();

                match db_err.kind() {
                    // "UNIQUE constraint failed: tables.number"
                    SqlxKind::UniqueViolation => DbError::UniqueViolation {
                        field: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or("unknown")
                            .to_string(),
                    },
                    SqlxKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    SqlxKind::CheckViolation => DbError::CheckViolation { message },
                    _ if db_err
                        .code()
                        .is_some_and(|code| SQLITE_BUSY_CODES.iter().any(|busy| code == *busy)) =>
                    {
                        DbError::Busy(message)
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

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

// =============================================================================
// Manager Error
// =============================================================================

/// Errors surfaced by [`crate::TableSessionManager`].
///
/// Rule failures and store failures stay apart so the caller can tell
/// "invalid QR" from "database down".
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Table/session rule failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl ManagerError {
    /// Domain category, or `None` for infrastructure failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ManagerError::Core(err) => Some(err.kind()),
            ManagerError::Store(_) => None,
        }
    }

    /// Shorthand for checks in callers and tests.
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }
}

impl From<sqlx::Error> for ManagerError {
    fn from(err: sqlx::Error) -> Self {
        ManagerError::Store(err.into())
    }
}

impl From<ValidationError> for ManagerError {
    fn from(err: ValidationError) -> Self {
        ManagerError::Core(err.into())
    }
}

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
