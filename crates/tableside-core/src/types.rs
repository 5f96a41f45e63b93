//! # Domain Types
//!
//! Core domain types used throughout Tableside.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   weak ref    ┌─────────────────────┐         │
//! │  │       Table         │ ────────────► │      Session        │         │
//! │  │  ─────────────────  │               │  ─────────────────  │         │
//! │  │  id (store)         │ ◄──────────── │  id (random UUID)   │         │
//! │  │  number (staff)     │   table_id    │  table_id           │         │
//! │  │  code (QR token)    │               │  active             │         │
//! │  │  status             │               │  created_at         │         │
//! │  │  active_session_id  │               │  expires_at         │         │
//! │  └─────────────────────┘               └─────────────────────┘         │
//! │                                                                         │
//! │  ┌─────────────────────┐                                               │
//! │  │    TableStatus      │   available → occupied → cleaning → ...       │
//! │  └─────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Tables carry a store id for relations, a staff-facing `number`, and an
//! opaque `code` that is printed into the QR artifact. Sessions are only ever
//! addressed by their random id.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Table Status
// =============================================================================

/// Occupancy status of a physical table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Free for the next party.
    #[default]
    Available,
    /// Bound to exactly one active session.
    Occupied,
    /// Being reset by staff. Advisory only: a scan still re-occupies it.
    Cleaning,
}

impl TableStatus {
    /// All statuses, in dashboard order.
    pub const ALL: [TableStatus; 3] = [
        TableStatus::Available,
        TableStatus::Occupied,
        TableStatus::Cleaning,
    ];

    /// Returns the stored/serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Parses a status name coming from the transport layer.
///
/// Unknown names are an `InvalidTransition`: the only place a status string
/// arrives from outside is a staff status change.
impl FromStr for TableStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let wanted = s.trim();
        TableStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::invalid_transition(format!("unrecognized status '{s}'")))
    }
}

// =============================================================================
// Table
// =============================================================================

/// A physical table that customers scan to start ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Store-assigned identifier.
    pub id: i64,

    /// Human-facing table number (unique, staff-assigned).
    pub number: i64,

    /// Opaque scan token printed in the QR artifact. Immutable.
    pub code: String,

    /// Current occupancy status.
    pub status: TableStatus,

    /// Session currently bound to this table. Set iff `status == Occupied`.
    pub active_session_id: Option<String>,

    /// When the table was provisioned.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When status or binding last changed.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Table {
    /// Checks whether the table is currently marked occupied.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.status == TableStatus::Occupied
    }

    /// Returns the bound session id, if the table is occupied.
    pub fn bound_session_id(&self) -> Option<&str> {
        match self.status {
            TableStatus::Occupied => self.active_session_id.as_deref(),
            _ => None,
        }
    }

    /// Checks whether `session_id` is the one this table is bound to.
    pub fn is_bound_to(&self, session_id: &str) -> bool {
        self.bound_session_id() == Some(session_id)
    }
}

// =============================================================================
// Session
// =============================================================================

/// A bounded-lifetime ordering context bound to exactly one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Random, unguessable identifier.
    pub id: String,

    /// Table this session is bound to. Set once.
    pub table_id: i64,

    /// False once explicitly deactivated.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Fixed at creation; never extended by activity.
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Checks whether `now` is past the expiry instant.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A session is valid iff it is active and not yet expired.
    #[inline]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }

    /// Fails with `SessionExpired` unless the session is valid at `now`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use tableside_core::{Session, SessionPolicy};
    ///
    /// let now = Utc::now();
    /// let session = Session::mint(7, now, &SessionPolicy::default());
    /// assert!(session.ensure_live(now).is_ok());
    /// assert!(session.ensure_live(now + Duration::hours(25)).is_err());
    /// ```
    pub fn ensure_live(&self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.is_valid_at(now) {
            Ok(())
        } else {
            Err(CoreError::SessionExpired(self.id.clone()))
        }
    }

    /// Time left before expiry, zero once expired or deactivated.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        if !self.is_valid_at(now) {
            return chrono::Duration::zero();
        }
        self.expires_at - now
    }
}

// =============================================================================
// Composite Results
// =============================================================================

/// Result of turning a scanned code into a usable pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedSession {
    pub table: Table,
    pub session: Session,
}

/// A session together with the table it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionDetails {
    pub session: Session,
    pub table: Table,
}

/// One row of the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableOverview {
    pub table: Table,
    /// Session referenced by `table.active_session_id`, if it still exists.
    pub session: Option<Session>,
    /// True when `session` is present and valid right now.
    pub session_live: bool,
}

impl TableOverview {
    /// Occupied flag that no longer matches a live session.
    ///
    /// Expiry is evaluated lazily, so this stays true until the next scan or
    /// staff action touches the table.
    pub fn is_stale(&self) -> bool {
        self.table.is_occupied() && !self.session_live
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
