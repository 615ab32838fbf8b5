//! PostgreSQL adapters implementing the database ports.

mod identities;
mod tokens;

pub use identities::PostgresIdentityStore;
pub use tokens::PostgresTokenStore;

use uuid::Uuid;

use super::conflict_or;
use crate::codec::StoredValue;
use crate::error::{Result, RolodexError};

/// Unwrap a codec output that PostgreSQL binds as a native `UUID`.
fn native_uuid(stored: StoredValue) -> Result<Uuid> {
    match stored {
        StoredValue::Uuid(uuid) => Ok(uuid),
        other => Err(RolodexError::Internal(format!(
            "expected a native UUID for PostgreSQL, got {other:?}"
        ))),
    }
}
