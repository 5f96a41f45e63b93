//! # Session Policy
//!
//! How sessions are minted and how long they live.
//!
//! Expiry is fixed at creation (`expires_at = created_at + lifetime`) and is
//! never extended by activity. Nothing sweeps expired sessions; callers
//! evaluate [`Session::is_valid_at`] when they read one.

use chrono::{DateTime, Duration, Utc};

use crate::token::generate_session_id;
use crate::types::Session;
use crate::validation::{validate_session_lifetime_hours, ValidationResult};
use crate::SESSION_LIFETIME_HOURS;

/// Lifetime settings applied when a session is minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// How long a session stays valid after creation.
    pub lifetime: Duration,
}

impl SessionPolicy {
    /// Policy with a custom lifetime.
    pub fn with_lifetime(lifetime: Duration) -> Self {
        SessionPolicy { lifetime }
    }

    /// Policy with a lifetime given in whole hours.
    ///
    /// ## Errors
    /// - `OutOfRange` unless `1 <= hours <= MAX_SESSION_LIFETIME_HOURS`
    pub fn from_hours(hours: i64) -> ValidationResult<Self> {
        validate_session_lifetime_hours(hours)?;
        Ok(SessionPolicy::with_lifetime(Duration::hours(hours)))
    }

    /// Expiry instant for a session created at `created_at`.
    ///
    /// Saturates at the latest representable instant.
    #[inline]
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at
            .checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        SessionPolicy::with_lifetime(Duration::hours(SESSION_LIFETIME_HOURS))
    }
}

impl Session {
    /// Builds a fresh, active session for `table_id`.
    ///
    /// The id is random and independent of the table's number or code.
    /// Nothing is persisted here; the store decides whether it wins.
    pub fn mint(table_id: i64, now: DateTime<Utc>, policy: &SessionPolicy) -> Session {
        Session {
            id: generate_session_id(),
            table_id,
            active: true,
            created_at: now,
            expires_at: policy.expires_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_is_24h() {
        assert_eq!(SessionPolicy::default().lifetime, Duration::hours(24));
    }

    #[test]
    fn test_mint_sets_expiry_from_policy() {
        let now = Utc::now();
        let session = Session::mint(3, now, &SessionPolicy::from_hours(2).unwrap());

        assert_eq!(session.table_id, 3);
        assert!(session.active);
        assert_eq!(session.created_at, now);
        assert_eq!(session.expires_at, now + Duration::hours(2));
    }

    #[test]
    fn test_out_of_range_lifetime_rejected() {
        assert!(SessionPolicy::from_hours(0).is_err());
        assert!(SessionPolicy::from_hours(10_000_000_000).is_err());
        assert!(SessionPolicy::from_hours(i64::MAX).is_err());
    }

    #[test]
    fn test_huge_lifetime_saturates_expiry() {
        let policy = SessionPolicy::with_lifetime(Duration::MAX);
        let session = Session::mint(1, Utc::now(), &policy);
        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let now = Utc::now();
        let policy = SessionPolicy::default();
        let a = Session::mint(1, now, &policy);
        let b = Session::mint(1, now, &policy);
        assert_ne!(a.id, b.id);
    }
}
