//! Password sealing and bearer-token digests.

pub mod crypto;

pub use crypto::{CredentialSealer, CredentialSealerError};
