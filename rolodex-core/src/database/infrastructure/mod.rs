//! Storage adapters implementing the database ports.

pub mod memory;
pub mod postgres;
pub mod sqlite;

use crate::error::RolodexError;

/// Unique violations become `Conflict`; everything else stays a database
/// error.
fn conflict_or(err: sqlx::Error, what: &str) -> RolodexError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            RolodexError::Conflict(format!("{what} already exists"))
        }
        _ => RolodexError::Database(err),
    }
}
