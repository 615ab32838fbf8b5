//! Repository ports. Application code depends on these traits only.

pub mod identities;
pub mod tokens;

pub use identities::IdentityStore;
pub use tokens::TokenStore;
