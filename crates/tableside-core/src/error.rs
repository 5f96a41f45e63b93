//! # Error Types
//!
//! Domain-specific error types for tableside-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tableside-core errors (this file)                                     │
//! │  ├── CoreError        - Table/session rule failures                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tableside-db errors (separate crate)                                  │
//! │  ├── DbError          - Store failures (propagated unmodified)         │
//! │  └── ManagerError     - CoreError | DbError                            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ManagerError → transport layer    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport layer only needs [`ErrorKind`] to pick a response:
//! a scan of an unknown code is `NotFound` ("invalid QR"), a stale session id
//! is `Expired`, a rejected staff change is `InvalidTransition`.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Table/session rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No table has this id.
    #[error("Table not found: {0}")]
    TableNotFound(i64),

    /// No table has this scan code.
    ///
    /// ## When This Occurs
    /// - QR artifact printed for a table that was re-provisioned
    /// - Hand-typed or truncated code
    #[error("No table for code: {0}")]
    TableCodeNotFound(String),

    /// No session has this id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session exists but is deactivated or past its expiry.
    ///
    /// Distinct from [`CoreError::SessionNotFound`]: the id was valid once.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// A staff status change was rejected.
    ///
    /// ## When This Occurs
    /// - Unrecognized status string
    /// - `occupied` requested without a session
    /// - Session belongs to another table or is no longer live
    #[error("Invalid table transition: {reason}")]
    InvalidTransition { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTransition error.
    pub fn invalid_transition(reason: impl Into<String>) -> Self {
        CoreError::InvalidTransition {
            reason: reason.into(),
        }
    }

    /// Returns the coarse category the transport layer maps to a response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TableNotFound(_)
            | CoreError::TableCodeNotFound(_)
            | CoreError::SessionNotFound(_) => ErrorKind::NotFound,
            CoreError::SessionExpired(_) => ErrorKind::Expired,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Coarse error category surfaced upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Expired,
    InvalidTransition,
    Validation,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before anything reaches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
