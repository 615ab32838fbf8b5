//! In-process adapters.
//!
//! Rows are kept in the storage representation the configured
//! [`BackendKind`](crate::codec::BackendKind) would use, so every read and
//! write goes through the same codecs a real database adapter would.

mod identities;
mod tokens;

pub use identities::InMemoryIdentityStore;
pub use tokens::InMemoryTokenStore;
