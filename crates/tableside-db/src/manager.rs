//! # Table-Session Manager
//!
//! Turns a scanned table code into a usable ordering session and applies
//! staff status changes, keeping every table bound to at most one live
//! session.
//!
//! ## Resolve Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    resolve_session_for_code(code)                       │
//! │                                                                         │
//! │  ┌──► 1. read table by code ───────────────► not found → NotFound       │
//! │  │    2. read bound session (if occupied)                               │
//! │  │    3. plan_resolution(table, session, now)                           │
//! │  │         │                                                            │
//! │  │         ├── Reuse(session) ─────────────► return {table, session}    │
//! │  │         │                                                            │
//! │  │         └── Mint                                                     │
//! │  │              BEGIN                                                   │
//! │  │                INSERT session                                        │
//! │  │                UPDATE tables ... WHERE <state seen in 1>             │
//! │  │              ├── 1 row  → COMMIT ──────► return {table', session}    │
//! │  │              └── 0 rows → ROLLBACK                                   │
//! │  └──────────────────────────┘   (at most MAX_RESOLVE_ATTEMPTS rounds)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staff vs Scan
//! Staff transitions open a transaction whose first statement is a write, so
//! they serialize with the mint transaction above. Whichever commits last
//! wins:
//! - a release that lands after a mint deactivates the fresh session
//! - a mint that lands after a release sees the new state and re-occupies
//!
//! Expiry is evaluated lazily. An `occupied` flag may point at an expired
//! session until the next scan or staff action touches the table.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DbError, ManagerResult};
use crate::pool::Database;
use crate::repository::{SessionRepository, TableRepository};
use tableside_core::lifecycle::{plan_resolution, plan_staff_transition, Resolution};
use tableside_core::validation::{validate_session_id, validate_table_code};
use tableside_core::{
    CoreError, ResolvedSession, Session, SessionDetails, SessionPolicy, Table, TableOverview,
    TableStatus,
};

/// Upper bound on read → mint rounds for one resolve call.
///
/// A round is only repeated when another writer changed the table between
/// the read and the compare-and-swap; the next round then finds that
/// writer's result.
pub const MAX_RESOLVE_ATTEMPTS: u32 = 5;

/// Stateless coordinator over the table and session stores.
///
/// Cheap to clone. Every call reads and writes through the injected
/// [`Database`]; nothing is cached between calls.
///
/// ## Usage
/// ```rust,ignore
/// let manager = TableSessionManager::new(db);
///
/// let resolved = manager.resolve_session_for_code("abc123").await?;
/// manager.deactivate_session(&resolved.session.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TableSessionManager {
    db: Database,
    policy: SessionPolicy,
}

impl TableSessionManager {
    /// Creates a manager with the default 24h session lifetime.
    pub fn new(db: Database) -> Self {
        Self::with_policy(db, SessionPolicy::default())
    }

    /// Creates a manager with a custom session policy.
    pub fn with_policy(db: Database, policy: SessionPolicy) -> Self {
        TableSessionManager { db, policy }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Policy applied to newly minted sessions.
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    // =========================================================================
    // Scan Resolution
    // =========================================================================

    /// Returns the table's live session, minting one if needed.
    ///
    /// Repeated calls with no intervening expiry or deactivation return the
    /// same session. An expired session that is still flagged active is
    /// replaced but left as it is.
    ///
    /// ## Errors
    /// - `NotFound` if no table carries `code`
    /// - `TransactionFailed` if every round lost the compare-and-swap
    pub async fn resolve_session_for_code(&self, code: &str) -> ManagerResult<ResolvedSession> {
        // A malformed code cannot match any table.
        if validate_table_code(code).is_err() {
            return Err(CoreError::TableCodeNotFound(code.to_string()).into());
        }

        let tables = self.db.tables();
        let sessions = self.db.sessions();

        for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
            let table = tables
                .find_by_code(code)
                .await?
                .ok_or_else(|| CoreError::TableCodeNotFound(code.to_string()))?;

            let bound = match table.bound_session_id() {
                Some(session_id) => sessions.find_by_id(session_id).await?,
                None => None,
            };

            let now = Utc::now();
            match plan_resolution(&table, bound, now) {
                Resolution::Reuse(session) => {
                    debug!(table = table.number, session_id = %session.id, "Reusing live session");
                    return Ok(ResolvedSession { table, session });
                }
                Resolution::Mint { stale_session_id } => {
                    if let Some(resolved) = self.try_mint(&table, now).await? {
                        info!(
                            table = resolved.table.number,
                            session_id = %resolved.session.id,
                            replaced = ?stale_session_id,
                            "Session minted"
                        );
                        return Ok(resolved);
                    }

                    warn!(
                        table = table.number,
                        attempt = attempt,
                        "Table changed during resolve, retrying"
                    );
                }
            }
        }

        Err(DbError::TransactionFailed(format!(
            "could not resolve session for table code after {MAX_RESOLVE_ATTEMPTS} attempts"
        ))
        .into())
    }

    /// Inserts a fresh session and binds it if `observed` is still current.
    ///
    /// Returns `None`, with nothing written, when another writer got there
    /// first.
    async fn try_mint(
        &self,
        observed: &Table,
        now: chrono::DateTime<Utc>,
    ) -> ManagerResult<Option<ResolvedSession>> {
        let session = Session::mint(observed.id, now, &self.policy);

        let mut tx = self.db.pool().begin().await?;

        SessionRepository::insert_in(&mut *tx, &session).await?;

        match TableRepository::bind_session_if_unchanged(&mut *tx, observed, &session.id, now)
            .await?
        {
            Some(table) => {
                tx.commit().await?;
                Ok(Some(ResolvedSession { table, session }))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Gets a session by id. Does not check expiry.
    pub async fn get_session(&self, id: &str) -> ManagerResult<Session> {
        if validate_session_id(id).is_err() {
            return Err(CoreError::SessionNotFound(id.to_string()).into());
        }

        self.db
            .sessions()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(id.to_string()).into())
    }

    /// Gets a session that is usable right now.
    ///
    /// ## Errors
    /// - `NotFound` if the session does not exist
    /// - `Expired` if it was deactivated or has passed its expiry
    pub async fn get_live_session(&self, id: &str) -> ManagerResult<Session> {
        let session = self.get_session(id).await?;
        session.ensure_live(Utc::now())?;
        Ok(session)
    }

    /// Gets a session together with its table.
    pub async fn get_session_details(&self, id: &str) -> ManagerResult<SessionDetails> {
        let session = self.get_session(id).await?;
        let table = self.get_table(session.table_id).await?;
        Ok(SessionDetails { session, table })
    }

    /// Marks a session inactive. Idempotent.
    ///
    /// The table keeps its status; the next scan mints a replacement.
    pub async fn deactivate_session(&self, id: &str) -> ManagerResult<()> {
        if validate_session_id(id).is_err() || !self.db.sessions().set_active(id, false).await? {
            return Err(CoreError::SessionNotFound(id.to_string()).into());
        }

        info!(session_id = %id, "Session deactivated");
        Ok(())
    }

    // =========================================================================
    // Staff Transitions
    // =========================================================================

    /// Applies a staff status change.
    ///
    /// Moving to `occupied` needs `session_id` naming a live session of this
    /// table. Moving to `available` or `cleaning` clears the binding; any
    /// session the table was bound to before is deactivated in the same
    /// transaction. `session_id` is ignored for those targets.
    ///
    /// ## Errors
    /// - `NotFound` if the table does not exist
    /// - `InvalidTransition` if an occupy request has no usable session
    pub async fn set_table_status(
        &self,
        table_id: i64,
        status: TableStatus,
        session_id: Option<&str>,
    ) -> ManagerResult<Table> {
        let mut tx = self.db.pool().begin().await?;

        if !TableRepository::lock_in(&mut *tx, table_id).await? {
            return Err(CoreError::TableNotFound(table_id).into());
        }

        let table = TableRepository::find_by_id_in(&mut *tx, table_id)
            .await?
            .ok_or(CoreError::TableNotFound(table_id))?;

        let session = match (status, session_id) {
            (TableStatus::Occupied, Some(id)) => Some(
                SessionRepository::find_by_id_in(&mut *tx, id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::invalid_transition(format!("session {id} does not exist"))
                    })?,
            ),
            _ => None,
        };

        let now = Utc::now();
        let plan = plan_staff_transition(&table, status, session.as_ref(), now)?;

        if let Some(released) = plan.released_session_id.as_deref() {
            SessionRepository::set_active_in(&mut *tx, released, false).await?;
        }

        let updated = TableRepository::update_status_in(
            &mut *tx,
            table_id,
            plan.status,
            plan.session_id.as_deref(),
            now,
        )
        .await?
        .ok_or(CoreError::TableNotFound(table_id))?;

        tx.commit().await?;

        info!(
            table = updated.number,
            from = %table.status,
            to = %updated.status,
            released = ?plan.released_session_id,
            "Table status changed"
        );

        Ok(updated)
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Provisions a new table with a generated scan code.
    pub async fn create_table(&self, number: i64) -> ManagerResult<Table> {
        let table = self.db.tables().create(number).await?;
        info!(table = table.number, id = table.id, "Table provisioned");
        Ok(table)
    }

    /// All tables ordered by number.
    pub async fn list_tables(&self) -> ManagerResult<Vec<Table>> {
        Ok(self.db.tables().list_all().await?)
    }

    /// Gets a table by id.
    pub async fn get_table(&self, id: i64) -> ManagerResult<Table> {
        self.db
            .tables()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TableNotFound(id).into())
    }

    /// Gets a table by its scan code.
    pub async fn get_table_by_code(&self, code: &str) -> ManagerResult<Table> {
        self.db
            .tables()
            .find_by_code(code)
            .await?
            .ok_or_else(|| CoreError::TableCodeNotFound(code.to_string()).into())
    }

    /// Dashboard rows: each table with its bound session and whether that
    /// session is live right now.
    pub async fn table_overview(&self) -> ManagerResult<Vec<TableOverview>> {
        let sessions = self.db.sessions();
        let now = Utc::now();

        let mut rows = Vec::new();
        for table in self.db.tables().list_all().await? {
            let session = match table.bound_session_id() {
                Some(id) => sessions.find_by_id(id).await?,
                None => None,
            };
            let session_live = session
                .as_ref()
                .is_some_and(|s| s.table_id == table.id && s.is_valid_at(now));

            rows.push(TableOverview {
                table,
                session,
                session_live,
            });
        }

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbConfig, ManagerError};
    use chrono::Duration;
    use tableside_core::ErrorKind;

    async fn manager() -> TableSessionManager {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        TableSessionManager::new(db)
    }

    async fn table_with_code(manager: &TableSessionManager, number: i64, code: &str) -> Table {
        manager
            .database()
            .tables()
            .create_with_code(number, code)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_mints_and_occupies() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;

        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        assert_eq!(resolved.table.status, TableStatus::Occupied);
        assert!(resolved.table.is_bound_to(&resolved.session.id));
        assert!(resolved.session.active);
        assert_eq!(
            resolved.session.expires_at - resolved.session.created_at,
            Duration::hours(24)
        );
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;

        let first = manager.resolve_session_for_code("abc123").await.unwrap();
        let second = manager.resolve_session_for_code("abc123").await.unwrap();

        assert_eq!(first.session.id, second.session.id);
        assert_eq!(first.table.updated_at, second.table.updated_at);
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let manager = manager().await;

        let err = manager.resolve_session_for_code("zzz").await.unwrap_err();
        assert!(err.is_not_found());

        let err = manager.resolve_session_for_code("").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_custom_policy_lifetime() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let manager = TableSessionManager::with_policy(db, SessionPolicy::from_hours(2).unwrap());
        table_with_code(&manager, 1, "t1").await;

        let resolved = manager.resolve_session_for_code("t1").await.unwrap();
        assert_eq!(
            resolved.session.expires_at - resolved.session.created_at,
            Duration::hours(2)
        );
    }

    #[tokio::test]
    async fn test_deactivate_then_resolve_mints_new() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;

        let first = manager.resolve_session_for_code("abc123").await.unwrap();
        manager.deactivate_session(&first.session.id).await.unwrap();

        // Table status is untouched by deactivation.
        let table = manager.get_table(first.table.id).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        let second = manager.resolve_session_for_code("abc123").await.unwrap();
        assert_ne!(first.session.id, second.session.id);
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;
        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        manager.deactivate_session(&resolved.session.id).await.unwrap();
        manager.deactivate_session(&resolved.session.id).await.unwrap();

        let err = manager.deactivate_session("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(manager.deactivate_session("").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_live_session() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;
        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        let live = manager.get_live_session(&resolved.session.id).await.unwrap();
        assert_eq!(live.id, resolved.session.id);

        manager.deactivate_session(&resolved.session.id).await.unwrap();
        let err = manager.get_live_session(&resolved.session.id).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Expired));

        // Plain lookup does not care.
        assert!(manager.get_session(&resolved.session.id).await.is_ok());

        let err = manager.get_live_session("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_session_details_include_table() {
        let manager = manager().await;
        table_with_code(&manager, 7, "abc123").await;
        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        let details = manager
            .get_session_details(&resolved.session.id)
            .await
            .unwrap();
        assert_eq!(details.table.number, 7);
        assert_eq!(details.session.id, resolved.session.id);
    }

    #[tokio::test]
    async fn test_staff_cleaning_releases_and_deactivates() {
        let manager = manager().await;
        let table = table_with_code(&manager, 5, "abc123").await;
        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        let updated = manager
            .set_table_status(table.id, TableStatus::Cleaning, None)
            .await
            .unwrap();
        assert_eq!(updated.status, TableStatus::Cleaning);
        assert_eq!(updated.active_session_id, None);

        let old = manager.get_session(&resolved.session.id).await.unwrap();
        assert!(!old.active);
    }

    #[tokio::test]
    async fn test_cleaning_table_is_reoccupied_by_scan() {
        let manager = manager().await;
        let table = table_with_code(&manager, 5, "abc123").await;
        let first = manager.resolve_session_for_code("abc123").await.unwrap();

        manager
            .set_table_status(table.id, TableStatus::Cleaning, None)
            .await
            .unwrap();

        let second = manager.resolve_session_for_code("abc123").await.unwrap();
        assert_eq!(second.table.status, TableStatus::Occupied);
        assert_ne!(first.session.id, second.session.id);
    }

    #[tokio::test]
    async fn test_staff_occupy_with_own_session() {
        let manager = manager().await;
        let table = table_with_code(&manager, 5, "abc123").await;
        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();

        let updated = manager
            .set_table_status(table.id, TableStatus::Occupied, Some(&resolved.session.id))
            .await
            .unwrap();
        assert!(updated.is_bound_to(&resolved.session.id));
        assert!(manager.get_live_session(&resolved.session.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_staff_occupy_rejects_foreign_session() {
        let manager = manager().await;
        let t1 = table_with_code(&manager, 1, "one").await;
        table_with_code(&manager, 2, "two").await;
        let other = manager.resolve_session_for_code("two").await.unwrap();

        let err = manager
            .set_table_status(t1.id, TableStatus::Occupied, Some(&other.session.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidTransition));

        // Nothing changed.
        let t1 = manager.get_table(t1.id).await.unwrap();
        assert_eq!(t1.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_staff_occupy_without_session() {
        let manager = manager().await;
        let table = table_with_code(&manager, 1, "one").await;

        let err = manager
            .set_table_status(table.id, TableStatus::Occupied, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidTransition));

        let err = manager
            .set_table_status(table.id, TableStatus::Occupied, Some("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidTransition));
    }

    #[tokio::test]
    async fn test_staff_unknown_table() {
        let manager = manager().await;

        let err = manager
            .set_table_status(99, TableStatus::Available, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::Core(CoreError::TableNotFound(99))));
    }

    #[tokio::test]
    async fn test_expired_session_is_replaced_but_not_deactivated() {
        let manager = manager().await;
        table_with_code(&manager, 5, "abc123").await;
        let first = manager.resolve_session_for_code("abc123").await.unwrap();

        sqlx::query("UPDATE sessions SET expires_at = ?2 WHERE id = ?1")
            .bind(&first.session.id)
            .bind(Utc::now() - Duration::minutes(1))
            .execute(manager.database().pool())
            .await
            .unwrap();

        let second = manager.resolve_session_for_code("abc123").await.unwrap();
        assert_ne!(first.session.id, second.session.id);

        let old = manager.get_session(&first.session.id).await.unwrap();
        assert!(old.active);
        assert!(old.is_expired_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_dangling_binding_self_heals() {
        let manager = manager().await;
        let table = table_with_code(&manager, 5, "abc123").await;

        sqlx::query(
            "UPDATE tables SET status = 'occupied', active_session_id = 'ghost' WHERE id = ?1",
        )
        .bind(table.id)
        .execute(manager.database().pool())
        .await
        .unwrap();

        let resolved = manager.resolve_session_for_code("abc123").await.unwrap();
        assert_ne!(resolved.session.id, "ghost");
        assert!(resolved.table.is_bound_to(&resolved.session.id));
    }

    #[tokio::test]
    async fn test_overview_reports_live_and_stale() {
        let manager = manager().await;
        table_with_code(&manager, 1, "one").await;
        table_with_code(&manager, 2, "two").await;
        table_with_code(&manager, 3, "three").await;

        manager.resolve_session_for_code("one").await.unwrap();
        let two = manager.resolve_session_for_code("two").await.unwrap();
        manager.deactivate_session(&two.session.id).await.unwrap();

        let rows = manager.table_overview().await.unwrap();
        assert_eq!(rows.len(), 3);

        assert!(rows[0].session_live);
        assert!(!rows[0].is_stale());

        assert!(rows[1].session.is_some());
        assert!(rows[1].is_stale());

        assert!(rows[2].session.is_none());
        assert!(!rows[2].is_stale());
    }

    #[tokio::test]
    async fn test_create_table_and_lookup() {
        let manager = manager().await;

        let table = manager.create_table(12).await.unwrap();
        assert_eq!(manager.get_table_by_code(&table.code).await.unwrap(), table);
        assert_eq!(manager.list_tables().await.unwrap(), vec![table]);

        assert!(manager.get_table(404).await.unwrap_err().is_not_found());
        assert!(manager
            .get_table_by_code("missing")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_create_table_rejects_bad_number() {
        let manager = manager().await;

        let err = manager.create_table(10_000).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
    }
}
