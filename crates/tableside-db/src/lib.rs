//! # tableside-db: Database Layer for Tableside
//!
//! This crate provides storage for tables and ordering sessions, and the
//! [`TableSessionManager`] that keeps them consistent. It uses SQLite for
//! storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tableside Data Flow                              │
//! │                                                                         │
//! │  Customer scan / staff action (transport layer, not in this crate)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tableside-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────────────────────────────────────────┐ │   │
//! │  │   │               TableSessionManager                        │ │   │
//! │  │   │  resolve · deactivate · set_table_status · overview      │ │   │
//! │  │   └──────────────────────────┬───────────────────────────────┘ │   │
//! │  │                              │                                  │   │
//! │  │   ┌───────────────┐    ┌─────┴─────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ TableRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SessionRepo   │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store and manager error types
//! - [`repository`] - Table and session repositories
//! - [`manager`] - Scan resolution and staff transitions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tableside_db::{Database, DbConfig, TableSessionManager};
//!
//! let db = Database::new(DbConfig::new("tableside.db")).await?;
//! let manager = TableSessionManager::new(db);
//!
//! let table = manager.create_table(5).await?;
//! let resolved = manager.resolve_session_for_code(&table.code).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod manager;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ManagerError, ManagerResult};
pub use manager::{TableSessionManager, MAX_RESOLVE_ATTEMPTS};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::session::SessionRepository;
pub use repository::table::TableRepository;
