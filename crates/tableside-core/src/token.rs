//! # Opaque Tokens
//!
//! Generators for the two opaque identifiers in the system:
//!
//! - **Table code**: short alphanumeric token printed in the QR artifact.
//!   Assigned once at provisioning and never reused.
//! - **Session id**: random UUID v4. Must not be derivable from anything a
//!   customer can see on the table.

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::TABLE_CODE_LENGTH;

/// Generates a new table scan code.
pub fn generate_table_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TABLE_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Generates a new session id.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
