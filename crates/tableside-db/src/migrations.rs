//! # Database Migrations
//!
//! The schema ships inside the binary; opening a database brings it up to
//! date.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   tables, sessions,
//!                              occupied ⇔ bound CHECK,
//!                              immutable code / session table triggers
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add `NNN_description.sql` to `migrations/sqlite/` with the next number
//! 2. **NEVER** edit an applied migration; its checksum is recorded

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration. Safe to call on an up-to-date database.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(
        version = latest_version(),
        "Schema up to date"
    );
    Ok(())
}

/// Highest migration version embedded in this build.
pub fn latest_version() -> i64 {
    MIGRATOR
        .iter()
        .map(|migration| migration.version)
        .max()
        .unwrap_or(0)
}

/// `(embedded, applied)` migration counts, for diagnostics.
///
/// A database that was never migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.iter().count();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((embedded, 0));
    }

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((embedded, applied as usize))
}
