//! # Table Repository
//!
//! Database operations for physical tables.
//!
//! ## Key Operations
//! - Provisioning with a generated scan code
//! - Lookup by id and by scan code
//! - Status writes: plain, compare-and-swap, and lock-then-write
//!
//! ## Compare-and-Swap Binding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scan A reads: status=available, session=NULL                           │
//! │  Scan B reads: status=available, session=NULL                           │
//! │                                                                         │
//! │  A: UPDATE ... SET occupied, S_A                                        │
//! │       WHERE id=1 AND status='available' AND session IS NULL → 1 row ✓   │
//! │  B: UPDATE ... SET occupied, S_B                                        │
//! │       WHERE id=1 AND status='available' AND session IS NULL → 0 rows ✗  │
//! │                                                                         │
//! │  B rolls back its session insert and re-reads: finds S_A.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `*_in` functions take any SQLite executor so the manager can run them
//! inside its own transaction; the methods on [`TableRepository`] run them
//! directly against the pool.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, ManagerError};
use tableside_core::token::generate_table_code;
use tableside_core::validation::{validate_table_code, validate_table_number};
use tableside_core::{Table, TableStatus};

/// Repository for table database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TableRepository::new(pool);
///
/// let table = repo.create(12).await?;
/// let same = repo.find_by_code(&table.code).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Gets a table by its scan code.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, number, code, status, active_session_id, created_at, updated_at
            FROM tables
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Gets a table by ID.
    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<Table>> {
        Self::find_by_id_in(&self.pool, id).await
    }

    /// Provisions a table with a freshly generated scan code.
    ///
    /// ## Errors
    /// - `Validation` (as `CoreError`) if the number is out of range
    /// - `UniqueViolation` if the number is already taken
    pub async fn create(&self, number: i64) -> Result<Table, ManagerError> {
        self.create_with_code(number, &generate_table_code()).await
    }

    /// Provisions a table with an explicit scan code.
    ///
    /// Used when importing tables whose QR artifacts are already printed.
    pub async fn create_with_code(
        &self,
        number: i64,
        code: &str,
    ) -> Result<Table, ManagerError> {
        validate_table_number(number)?;
        validate_table_code(code)?;

        debug!(number = number, "Provisioning table");

        let now = Utc::now();
        let table = sqlx::query_as::<_, Table>(
            r#"
            INSERT INTO tables (number, code, status, active_session_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, NULL, ?4, ?4)
            RETURNING id, number, code, status, active_session_id, created_at, updated_at
            "#,
        )
        .bind(number)
        .bind(code)
        .bind(TableStatus::Available)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(table)
    }

    /// Writes status and binding unconditionally.
    ///
    /// Returns `None` if the table does not exist. The manager never uses
    /// this for scans; see [`TableRepository::bind_session_if_unchanged`].
    pub async fn update_status(
        &self,
        id: i64,
        status: TableStatus,
        session_id: Option<&str>,
    ) -> DbResult<Option<Table>> {
        Self::update_status_in(&self.pool, id, status, session_id, Utc::now()).await
    }

    /// Lists all tables ordered by number.
    pub async fn list_all(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, number, code, status, active_session_id, created_at, updated_at
            FROM tables
            ORDER BY number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Counts provisioned tables.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Executor-generic operations (usable inside a transaction)
    // =========================================================================

    pub(crate) async fn find_by_id_in<'e, E>(executor: E, id: i64) -> DbResult<Option<Table>>
    where
        E: SqliteExecutor<'e>,
    {
        let table = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, number, code, status, active_session_id, created_at, updated_at
            FROM tables
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(table)
    }

    /// Takes the SQLite write lock by touching the row.
    ///
    /// Returns false if the table does not exist. Issued as the first
    /// statement of a transaction so later reads see the latest state and the
    /// transaction never has to upgrade from a read lock.
    pub(crate) async fn lock_in<'e, E>(executor: E, id: i64) -> DbResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("UPDATE tables SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn update_status_in<'e, E>(
        executor: E,
        id: i64,
        status: TableStatus,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Table>>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(table_id = id, status = %status, "Updating table status");

        let table = sqlx::query_as::<_, Table>(
            r#"
            UPDATE tables SET
                status = ?2,
                active_session_id = ?3,
                updated_at = ?4
            WHERE id = ?1
            RETURNING id, number, code, status, active_session_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(session_id)
        .bind(now)
        .fetch_optional(executor)
        .await?;

        Ok(table)
    }

    /// Binds `session_id` only if the table still looks like `observed`.
    ///
    /// Returns the updated table, or `None` when another writer changed the
    /// status or binding since `observed` was read.
    pub(crate) async fn bind_session_if_unchanged<'e, E>(
        executor: E,
        observed: &Table,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Table>>
    where
        E: SqliteExecutor<'e>,
    {
        let table = sqlx::query_as::<_, Table>(
            r#"
            UPDATE tables SET
                status = ?2,
                active_session_id = ?3,
                updated_at = ?4
            WHERE id = ?1
              AND status = ?5
              AND active_session_id IS ?6
            RETURNING id, number, code, status, active_session_id, created_at, updated_at
            "#,
        )
        .bind(observed.id)
        .bind(TableStatus::Occupied)
        .bind(session_id)
        .bind(now)
        .bind(observed.status)
        .bind(observed.active_session_id.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(table)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
