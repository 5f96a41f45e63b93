//! # Tableside Admin
//!
//! Staff command-line tool over the table-session manager.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse flags (clap)                                                  │
//! │  2. Initialize tracing (stderr, RUST_LOG aware)                         │
//! │  3. Load AdminConfig: .env → environment → flag overrides               │
//! │  4. Open database & run migrations                                      │
//! │  5. Build TableSessionManager with the configured session policy        │
//! │  6. Run the subcommand, print the result                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```bash
//! tableside-admin provision 12
//! tableside-admin overview --json
//! tableside-admin resolve Xk3p9QaLm2Tz
//! tableside-admin status 4 cleaning
//! tableside-admin close 1f0c2e9a-...
//! ```

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tableside_db::{Database, TableSessionManager};

use crate::cli::Cli;
use crate::config::AdminConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config = AdminConfig::from_env()
        .and_then(|config| config.with_overrides(cli.db.clone(), cli.ttl_hours))
        .context("invalid configuration")?;

    info!(
        path = %config.db_path.display(),
        ttl_hours = config.session_ttl_hours,
        "Configuration loaded"
    );

    let policy = config.session_policy().context("invalid configuration")?;

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening database {}", config.db_path.display()))?;

    let manager = TableSessionManager::with_policy(db.clone(), policy);

    let outcome = cli::run(&manager, cli.command, cli.json).await;
    db.close().await;
    outcome
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tableside=trace` - Show trace for tableside crates only
/// - Default: INFO, debug for tableside crates
///
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tableside=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
