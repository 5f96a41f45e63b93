//! # Validation Module
//!
//! Input validation for the few values staff and scanners hand us.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Transport / CLI     - type parsing                           │
//! │  Layer 2: THIS MODULE         - business rules (ranges, formats)       │
//! │  Layer 3: SQLite              - UNIQUE, CHECK, FOREIGN KEY             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tableside_core::validation::{validate_table_code, validate_table_number};
//!
//! validate_table_number(12).unwrap();
//! validate_table_code("abc123").unwrap();
//! assert!(validate_table_code("").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CODE_LENGTH, MAX_SESSION_LIFETIME_HOURS, MAX_TABLE_NUMBER};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a staff-assigned table number.
///
/// ## Rules
/// - Between 1 and [`MAX_TABLE_NUMBER`]
pub fn validate_table_number(number: i64) -> ValidationResult<()> {
    if !(1..=MAX_TABLE_NUMBER).contains(&number) {
        return Err(ValidationError::OutOfRange {
            field: "number".to_string(),
            min: 1,
            max: MAX_TABLE_NUMBER,
        });
    }
    Ok(())
}

/// Validates a configured session lifetime.
///
/// ## Rules
/// - Between 1 and [`MAX_SESSION_LIFETIME_HOURS`]
pub fn validate_session_lifetime_hours(hours: i64) -> ValidationResult<()> {
    if !(1..=MAX_SESSION_LIFETIME_HOURS).contains(&hours) {
        return Err(ValidationError::OutOfRange {
            field: "session_lifetime_hours".to_string(),
            min: 1,
            max: MAX_SESSION_LIFETIME_HOURS,
        });
    }
    Ok(())
}

/// Validates an explicitly supplied table code.
///
/// Generated codes always pass; this guards codes imported from existing QR
/// artifacts.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_CODE_LENGTH`] characters
/// - Letters, digits, hyphens and underscores only (it ends up in a URL)
pub fn validate_table_code(code: &str) -> ValidationResult<()> {
    validate_token("code", code)?;

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a session id supplied by a caller.
pub fn validate_session_id(id: &str) -> ValidationResult<()> {
    validate_token("session_id", id)
}

fn validate_token(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    Ok(())
}
