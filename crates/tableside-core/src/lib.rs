//! # tableside-core: Table/Session Rules for Tableside
//!
//! This crate holds the rules that bind physical tables to ordering sessions.
//! It has zero I/O dependencies; the store lives in `tableside-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tableside Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │      Customer devices (QR scan)      Staff dashboard / CLI      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        tableside-db: TableSessionManager + repositories         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ asks "what should happen?"             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tableside-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │  session  │  │ validation│  │   │
//! │  │   │   Table   │  │  resolve  │  │  policy   │  │   token   │  │   │
//! │  │   │  Session  │  │  staff    │  │  expiry   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Table, Session, TableStatus and composite results
//! - [`lifecycle`] - Resolution and staff transition planning
//! - [`session`] - Session lifetime policy and minting
//! - [`token`] - Table code and session id generation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tableside_core::{Session, SessionPolicy};
//!
//! let now = Utc::now();
//! let session = Session::mint(1, now, &SessionPolicy::default());
//! assert!(session.is_valid_at(now));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod session;
pub mod token;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use lifecycle::{Resolution, StaffTransition};
pub use session::SessionPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default session lifetime.
///
/// Covers any single seating with a wide margin; sessions are not extended
/// by activity.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Longest session lifetime a deployment may configure (one year).
pub const MAX_SESSION_LIFETIME_HOURS: i64 = 24 * 365;

/// Length of generated table codes.
pub const TABLE_CODE_LENGTH: usize = 12;

/// Longest accepted code or session id.
pub const MAX_CODE_LENGTH: usize = 64;

/// Highest table number staff may assign.
pub const MAX_TABLE_NUMBER: i64 = 9999;
