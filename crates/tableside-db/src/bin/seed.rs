//! # Seed Data Generator
//!
//! Provisions a dining room of tables for development.
//!
//! ## Usage
//! ```bash
//! # Provision tables 1..=8 (default)
//! cargo run -p tableside-db --bin seed
//!
//! # Provision a custom amount
//! cargo run -p tableside-db --bin seed -- --count 24
//!
//! # Specify database path, print the result as JSON
//! cargo run -p tableside-db --bin seed -- --db ./data/tableside.db --json
//! ```
//!
//! Each table gets the next number and a freshly generated scan code. The
//! codes are printed so they can be pasted into a QR generator.

use std::env;

use tableside_db::{Database, DbConfig, TableSessionManager};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: i64 = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path = String::from("./tableside_dev.db");
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Tableside Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of tables to provision (default: 8)");
                println!("  -d, --db <PATH>    Database file path (default: ./tableside_dev.db)");
                println!("      --json         Print provisioned tables as JSON");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tableside=info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !json {
        println!("Tableside Seed Data Generator");
        println!("=============================");
        println!("Database: {}", db_path);
        println!("Tables:   {}", count);
        println!();
    }

    // Connect to database (migrations run on connect)
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.tables().count().await?;
    if existing > 0 {
        eprintln!("Database already has {} tables", existing);
        eprintln!("  Skipping seed to avoid duplicate numbers.");
        eprintln!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let manager = TableSessionManager::new(db);

    let mut tables = Vec::new();
    for number in 1..=count {
        match manager.create_table(number).await {
            Ok(table) => tables.push(table),
            Err(e) => eprintln!("Failed to provision table {}: {}", number, e),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else {
        for table in &tables {
            println!("  Table {:>4}  code {}", table.number, table.code);
        }
        println!();
        println!("Provisioned {} tables", tables.len());
    }

    Ok(())
}
