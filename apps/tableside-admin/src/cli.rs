//! Command line surface.
//!
//! One subcommand per manager operation. Results go to stdout, as text or as
//! JSON with `--json`; logs go to stderr.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

use tableside_core::{Session, Table, TableStatus};
use tableside_db::TableSessionManager;

/// Staff tool for Tableside tables and ordering sessions.
#[derive(Debug, Parser)]
#[command(name = "tableside-admin", version, about)]
pub struct Cli {
    /// SQLite database file (overrides TABLESIDE_DB_PATH).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Lifetime of new sessions in hours (overrides TABLESIDE_SESSION_TTL_HOURS).
    #[arg(long, global = true)]
    pub ttl_hours: Option<i64>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision a new table with a generated scan code.
    Provision {
        /// Table number (1-9999).
        number: i64,
    },

    /// List tables with their session state.
    Overview,

    /// Show one table by scan code.
    Table {
        code: String,
    },

    /// Resolve a scanned code to its ordering session.
    Resolve {
        code: String,
    },

    /// Change a table's status (available, occupied, cleaning).
    Status {
        table_id: i64,
        status: String,
        /// Session to bind when setting `occupied`.
        #[arg(long)]
        session: Option<String>,
    },

    /// Show a session and its table.
    Session {
        session_id: String,
        /// Fail unless the session is active and unexpired.
        #[arg(long)]
        live: bool,
    },

    /// Deactivate a session.
    Close {
        session_id: String,
    },
}

/// Runs one subcommand against the manager.
pub async fn run(manager: &TableSessionManager, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Provision { number } => {
            let table = manager.create_table(number).await?;
            emit(json, &table, |t| {
                println!("Provisioned table {} (id {}) with code {}", t.number, t.id, t.code)
            })
        }

        Command::Overview => {
            let rows = manager.table_overview().await?;
            emit(json, &rows, |rows| {
                println!("{:>6}  {:<14} {:<10} {}", "TABLE", "CODE", "STATUS", "SESSION");
                for row in rows {
                    let session = match (&row.session, row.session_live) {
                        (Some(s), true) => s.id.clone(),
                        (Some(s), false) => format!("{} (stale)", s.id),
                        (None, _) if row.table.is_occupied() => "(missing)".to_string(),
                        (None, _) => "-".to_string(),
                    };
                    println!(
                        "{:>6}  {:<14} {:<10} {}",
                        row.table.number, row.table.code, row.table.status, session
                    );
                }
            })
        }

        Command::Table { code } => {
            let table = manager.get_table_by_code(&code).await?;
            emit(json, &table, print_table)
        }

        Command::Resolve { code } => {
            let resolved = manager.resolve_session_for_code(&code).await?;
            emit(json, &resolved, |r| {
                print_table(&r.table);
                print_session(&r.session);
            })
        }

        Command::Status {
            table_id,
            status,
            session,
        } => {
            let status: TableStatus = status.parse()?;
            let table = manager
                .set_table_status(table_id, status, session.as_deref())
                .await?;
            emit(json, &table, print_table)
        }

        Command::Session { session_id, live } => {
            if live {
                manager.get_live_session(&session_id).await?;
            }
            let details = manager.get_session_details(&session_id).await?;
            emit(json, &details, |d| {
                print_session(&d.session);
                print_table(&d.table);
            })
        }

        Command::Close { session_id } => {
            manager.deactivate_session(&session_id).await?;
            let session = manager.get_session(&session_id).await?;
            emit(json, &session, |s| println!("Session {} closed", s.id))
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_table(table: &Table) {
    println!("Table {} (id {})", table.number, table.id);
    println!("  code:    {}", table.code);
    println!("  status:  {}", table.status);
    if let Some(session_id) = &table.active_session_id {
        println!("  session: {}", session_id);
    }
}

fn print_session(session: &Session) {
    let now = Utc::now();
    let state = if session.is_valid_at(now) {
        let left = session.remaining_at(now);
        format!("live, {}h{:02}m left", left.num_hours(), left.num_minutes() % 60)
    } else if session.active {
        "expired".to_string()
    } else {
        "closed".to_string()
    };

    println!("Session {}", session.id);
    println!("  table id: {}", session.table_id);
    println!("  state:    {}", state);
    println!("  expires:  {}", session.expires_at.to_rfc3339());
}
