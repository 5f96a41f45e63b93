//! # Table Lifecycle
//!
//! Pure decision logic for table status changes. The store layer reads the
//! current rows, asks this module what to do, and then applies the answer
//! atomically.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Table Status Transitions                           │
//! │                                                                         │
//! │              scan (mint)                                                │
//! │  ┌───────────┐ ──────────► ┌───────────┐ ◄─┐                            │
//! │  │ available │             │ occupied  │   │ scan, bound session        │
//! │  └───────────┘ ◄────────── └───────────┘ ──┘ expired/missing (mint)     │
//! │        ▲          staff          │                                      │
//! │        │                         │ staff                                │
//! │        │ staff                   ▼                                      │
//! │        │                   ┌───────────┐                                │
//! │        └────────────────── │ cleaning  │ ── scan (mint) ──► occupied    │
//! │                            └───────────┘                                │
//! │                                                                         │
//! │  No terminal state: tables cycle indefinitely.                          │
//! │  `cleaning` is advisory, not a lock.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Session, Table, TableStatus};

// =============================================================================
// Scan Resolution
// =============================================================================

/// What a scan of a table's code should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The bound session is still valid; hand it back unchanged.
    Reuse(Session),
    /// Mint a new session and bind it.
    Mint {
        /// Session id the table pointed at before, if any (expired, inactive
        /// or deleted). Kept for logging; it is not deactivated here.
        stale_session_id: Option<String>,
    },
}

/// Decides between reusing the bound session and minting a new one.
///
/// `bound` is the session loaded through `table.active_session_id`, or `None`
/// if the table has no binding or the row is gone. It is handed back inside
/// [`Resolution::Reuse`] when it can be reused.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use tableside_core::lifecycle::{plan_resolution, Resolution};
/// use tableside_core::{Table, TableStatus};
///
/// let now = Utc::now();
/// let table = Table {
///     id: 1, number: 5, code: "abc123".into(),
///     status: TableStatus::Available, active_session_id: None,
///     created_at: now, updated_at: now,
/// };
/// assert_eq!(
///     plan_resolution(&table, None, now),
///     Resolution::Mint { stale_session_id: None }
/// );
/// ```
pub fn plan_resolution(table: &Table, bound: Option<Session>, now: DateTime<Utc>) -> Resolution {
    if let (Some(bound_id), Some(session)) = (table.bound_session_id(), bound) {
        if session.id == bound_id && session.table_id == table.id && session.is_valid_at(now) {
            return Resolution::Reuse(session);
        }
    }

    Resolution::Mint {
        stale_session_id: table.active_session_id.clone(),
    }
}

// =============================================================================
// Staff Transitions
// =============================================================================

/// A validated staff status change, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffTransition {
    /// Status to write.
    pub status: TableStatus,
    /// Binding to write (`Some` iff `status == Occupied`).
    pub session_id: Option<String>,
    /// Previously bound session that loses its table and must be deactivated.
    pub released_session_id: Option<String>,
}

/// Validates a staff-requested status change.
///
/// Staff are trusted: any status may follow any other. The only checks are
/// the ones that keep the occupied ⇔ bound invariant intact. For `occupied`
/// the caller passes the session named in the request (already loaded); it
/// must belong to this table and be valid at `now`.
pub fn plan_staff_transition(
    table: &Table,
    target: TableStatus,
    session: Option<&Session>,
    now: DateTime<Utc>,
) -> CoreResult<StaffTransition> {
    let session_id = match target {
        TableStatus::Occupied => {
            let session = session.ok_or_else(|| {
                CoreError::invalid_transition(format!(
                    "table {} cannot become occupied without a session",
                    table.number
                ))
            })?;

            if session.table_id != table.id {
                return Err(CoreError::invalid_transition(format!(
                    "session {} does not belong to table {}",
                    session.id, table.number
                )));
            }

            if !session.is_valid_at(now) {
                return Err(CoreError::invalid_transition(format!(
                    "session {} is no longer live",
                    session.id
                )));
            }

            Some(session.id.clone())
        }
        TableStatus::Available | TableStatus::Cleaning => None,
    };

    let released_session_id = table
        .active_session_id
        .clone()
        .filter(|previous| session_id.as_deref() != Some(previous.as_str()));

    Ok(StaffTransition {
        status: target,
        session_id,
        released_session_id,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn table(status: TableStatus, session: Option<&str>) -> Table {
        let now = Utc::now();
        Table {
            id: 1,
            number: 5,
            code: "abc123".to_string(),
            status,
            active_session_id: session.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    fn session(id: &str, table_id: i64, active: bool, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            table_id,
            active,
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_available_table_mints() {
        let plan = plan_resolution(&table(TableStatus::Available, None), None, Utc::now());
        assert_eq!(plan, Resolution::Mint { stale_session_id: None });
    }

    #[test]
    fn test_occupied_with_live_session_reuses() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-1", 1, true, Duration::hours(3));
        assert_eq!(
            plan_resolution(&t, Some(s.clone()), Utc::now()),
            Resolution::Reuse(s)
        );
    }

    #[test]
    fn test_expired_session_is_replaced() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-1", 1, true, Duration::hours(-1));
        assert_eq!(
            plan_resolution(&t, Some(s), Utc::now()),
            Resolution::Mint {
                stale_session_id: Some("s-1".to_string())
            }
        );
    }

    #[test]
    fn test_deactivated_session_is_replaced() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-1", 1, false, Duration::hours(3));
        assert!(matches!(
            plan_resolution(&t, Some(s), Utc::now()),
            Resolution::Mint { .. }
        ));
    }

    #[test]
    fn test_missing_session_row_self_heals() {
        let t = table(TableStatus::Occupied, Some("gone"));
        assert!(matches!(
            plan_resolution(&t, None, Utc::now()),
            Resolution::Mint { .. }
        ));
    }

    #[test]
    fn test_session_of_other_table_is_not_reused() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-1", 2, true, Duration::hours(3));
        assert!(matches!(
            plan_resolution(&t, Some(s), Utc::now()),
            Resolution::Mint { .. }
        ));
    }

    #[test]
    fn test_cleaning_table_is_reoccupied_by_scan() {
        let plan = plan_resolution(&table(TableStatus::Cleaning, None), None, Utc::now());
        assert!(matches!(plan, Resolution::Mint { .. }));
    }

    #[test]
    fn test_staff_release_clears_binding() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let plan = plan_staff_transition(&t, TableStatus::Cleaning, None, Utc::now()).unwrap();

        assert_eq!(plan.status, TableStatus::Cleaning);
        assert_eq!(plan.session_id, None);
        assert_eq!(plan.released_session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_staff_occupy_requires_session() {
        let t = table(TableStatus::Available, None);
        let err = plan_staff_transition(&t, TableStatus::Occupied, None, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_staff_occupy_rejects_foreign_session() {
        let t = table(TableStatus::Available, None);
        let s = session("s-9", 2, true, Duration::hours(1));
        let err =
            plan_staff_transition(&t, TableStatus::Occupied, Some(&s), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn test_staff_occupy_rejects_expired_session() {
        let t = table(TableStatus::Available, None);
        let s = session("s-1", 1, true, Duration::hours(-1));
        assert!(plan_staff_transition(&t, TableStatus::Occupied, Some(&s), Utc::now()).is_err());
    }

    #[test]
    fn test_staff_rebind_same_session_releases_nothing() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-1", 1, true, Duration::hours(1));
        let plan = plan_staff_transition(&t, TableStatus::Occupied, Some(&s), Utc::now()).unwrap();

        assert_eq!(plan.session_id.as_deref(), Some("s-1"));
        assert_eq!(plan.released_session_id, None);
    }

    #[test]
    fn test_staff_rebind_other_session_releases_previous() {
        let t = table(TableStatus::Occupied, Some("s-1"));
        let s = session("s-2", 1, true, Duration::hours(1));
        let plan = plan_staff_transition(&t, TableStatus::Occupied, Some(&s), Utc::now()).unwrap();

        assert_eq!(plan.released_session_id.as_deref(), Some("s-1"));
    }
}
