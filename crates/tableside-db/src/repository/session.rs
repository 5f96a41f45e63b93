//! # Session Repository
//!
//! Database operations for ordering sessions.
//!
//! Sessions are only inserted and flipped inactive; `table_id`, `created_at`
//! and `expires_at` never change after the insert. Expiry is evaluated in
//! Rust against the loaded row, never in SQL.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tableside_core::{Session, SessionPolicy};

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Mints and stores a fresh active session for `table_id`.
    ///
    /// Does not touch the table row; binding is the manager's job.
    pub async fn create(&self, table_id: i64, policy: &SessionPolicy) -> DbResult<Session> {
        let session = Session::mint(table_id, Utc::now(), policy);
        Self::insert_in(&self.pool, &session).await?;
        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Session>> {
        Self::find_by_id_in(&self.pool, id).await
    }

    /// Sets the active flag. Returns false if no such session exists.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<bool> {
        Self::set_active_in(&self.pool, id, active).await
    }

    /// Latest active session recorded for a table, expired or not.
    pub async fn find_active_for_table(&self, table_id: i64) -> DbResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, table_id, active, created_at, expires_at
            FROM sessions
            WHERE table_id = ?1 AND active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Full session history of a table, newest first.
    pub async fn list_for_table(&self, table_id: i64) -> DbResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, table_id, active, created_at, expires_at
            FROM sessions
            WHERE table_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Counts sessions that are active and unexpired at `now`.
    pub async fn count_live_for_table(&self, table_id: i64, now: DateTime<Utc>) -> DbResult<usize> {
        let live = self
            .list_for_table(table_id)
            .await?
            .iter()
            .filter(|s| s.is_valid_at(now))
            .count();

        Ok(live)
    }

    // =========================================================================
    // Executor-generic operations (usable inside a transaction)
    // =========================================================================

    pub(crate) async fn insert_in<'e, E>(executor: E, session: &Session) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(session_id = %session.id, table_id = session.table_id, "Inserting session");

        sqlx::query(
            r#"
            INSERT INTO sessions (id, table_id, active, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&session.id)
        .bind(session.table_id)
        .bind(session.active)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub(crate) async fn find_by_id_in<'e, E>(executor: E, id: &str) -> DbResult<Option<Session>>
    where
        E: SqliteExecutor<'e>,
    {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, table_id, active, created_at, expires_at
            FROM sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    pub(crate) async fn set_active_in<'e, E>(executor: E, id: &str, active: bool) -> DbResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(session_id = %id, active = active, "Setting session active flag");

        let result = sqlx::query("UPDATE sessions SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
