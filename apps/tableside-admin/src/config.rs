//! Admin tool configuration.
//!
//! Configuration is loaded from environment variables (after reading an
//! optional `.env` file) with fallback to defaults. Command line flags are
//! applied on top.
//!
//! | Variable                       | Default              |
//! |--------------------------------|----------------------|
//! | `TABLESIDE_DB_PATH`            | `./tableside.db`     |
//! | `TABLESIDE_DB_MAX_CONNECTIONS` | `5`                  |
//! | `TABLESIDE_SESSION_TTL_HOURS`  | `24`                 |
//!
//! The session TTL must lie between 1 and `MAX_SESSION_LIFETIME_HOURS`.

use std::env;
use std::path::PathBuf;

use tableside_core::validation::validate_session_lifetime_hours;
use tableside_core::{SessionPolicy, SESSION_LIFETIME_HOURS};
use tableside_db::DbConfig;

const DEFAULT_DB_PATH: &str = "./tableside.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Admin tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Pool size.
    pub max_connections: u32,

    /// Lifetime of newly minted sessions, in hours.
    pub session_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            session_ttl_hours: SESSION_LIFETIME_HOURS,
        }
    }
}

impl AdminConfig {
    /// Load configuration from `.env` and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AdminConfig::default();

        let config = AdminConfig {
            db_path: lookup("TABLESIDE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            max_connections: match lookup("TABLESIDE_DB_MAX_CONNECTIONS") {
                Some(raw) => parse_positive("TABLESIDE_DB_MAX_CONNECTIONS", &raw)?,
                None => defaults.max_connections,
            },

            session_ttl_hours: match lookup("TABLESIDE_SESSION_TTL_HOURS") {
                Some(raw) => parse_ttl_hours("TABLESIDE_SESSION_TTL_HOURS", &raw)?,
                None => defaults.session_ttl_hours,
            },
        };

        Ok(config)
    }

    /// Applies command line overrides.
    pub fn with_overrides(
        mut self,
        db_path: Option<PathBuf>,
        session_ttl_hours: Option<i64>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        if let Some(hours) = session_ttl_hours {
            self.session_ttl_hours = parse_ttl_hours("--ttl-hours", &hours.to_string())?;
        }
        Ok(self)
    }

    /// Database settings for [`tableside_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.max_connections)
    }

    /// Session lifetime policy for the manager.
    pub fn session_policy(&self) -> Result<SessionPolicy, ConfigError> {
        SessionPolicy::from_hours(self.session_ttl_hours).map_err(|_| ConfigError::InvalidValue {
            key: "session_ttl_hours".to_string(),
            value: self.session_ttl_hours.to_string(),
        })
    }
}

fn parse_ttl_hours(key: &str, raw: &str) -> Result<i64, ConfigError> {
    let hours: i64 = parse_positive(key, raw)?;
    validate_session_lifetime_hours(hours).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })?;
    Ok(hours)
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };

    let value: T = raw.trim().parse().map_err(|_| invalid())?;
    if value <= T::default() {
        return Err(invalid());
    }
    Ok(value)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
