//! # Repository Module
//!
//! Database repository implementations for Tableside.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and the Manager                         │
//! │                                                                         │
//! │  TableSessionManager                                                   │
//! │       │                                                                 │
//! │       │  single-row reads           multi-row atomic writes            │
//! │       ▼                             ▼                                   │
//! │  TableRepository / SessionRepository                                   │
//! │  ├── find_by_code, find_by_id ...   (&self, against the pool)          │
//! │  └── *_in(executor, ...)            (inside the manager's transaction) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TableRepository`] - Table provisioning, lookup, status writes
//! - [`SessionRepository`] - Session creation, lookup, deactivation

pub mod session;
pub mod table;

pub use session::SessionRepository;
pub use table::TableRepository;
