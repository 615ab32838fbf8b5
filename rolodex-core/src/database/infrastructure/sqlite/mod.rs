//! SQLite adapters implementing the database ports.
//!
//! SQLite has no UUID column type, so every identifier goes through
//! [`ValueCodec`](crate::codec::ValueCodec) as 32-digit text.

mod identities;
mod tokens;

pub use identities::SqliteIdentityStore;
pub use tokens::SqliteTokenStore;

use super::conflict_or;
use crate::codec::StoredValue;
use crate::error::{Result, RolodexError};

/// Unwrap a codec output that SQLite binds as `TEXT`.
fn text_uuid(stored: StoredValue) -> Result<String> {
    match stored {
        StoredValue::Text(text) => Ok(text),
        other => Err(RolodexError::Internal(format!(
            "expected a text UUID for SQLite, got {other:?}"
        ))),
    }
}
