use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use hmac::{Hmac, Mac};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use rolodex_model::Credential;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::error::RolodexError;

type HmacSha256 = Hmac<Sha256>;

/// Seals raw passwords into storable credentials and digests bearer tokens.
///
/// Passwords go through Argon2id with a random salt and a server-side
/// pepper. Bearer tokens are never stored; only their HMAC-SHA-256 digest
/// under the configured key is.
#[derive(Debug)]
pub struct CredentialSealer {
    argon2: Argon2<'static>,
    pepper: Zeroizing<Vec<u8>>,
    token_key: Zeroizing<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum CredentialSealerError {
    #[error("password pepper must not be empty")]
    EmptyPepper,
    #[error("token key must not be empty")]
    EmptyTokenKey,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("random source failed: {0}")]
    Entropy(String),
}

impl From<PasswordHashError> for CredentialSealerError {
    fn from(err: PasswordHashError) -> Self {
        CredentialSealerError::Hashing(err.to_string())
    }
}

impl From<CredentialSealerError> for RolodexError {
    fn from(err: CredentialSealerError) -> Self {
        RolodexError::Internal(err.to_string())
    }
}

impl CredentialSealer {
    const MEMORY_KIB: u32 = 64 * 1024;
    const ITERATIONS: u32 = 3;
    const PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    /// Bytes of entropy in an issued bearer token.
    pub const TOKEN_BYTES: usize = 32;

    /// Sealer with the production Argon2id cost (64 MiB, 3 passes).
    pub fn new(
        pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
    ) -> Result<Self, CredentialSealerError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::MEMORY_KIB)
            .t_cost(Self::ITERATIONS)
            .p_cost(Self::PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| {
                CredentialSealerError::InvalidParams(err.to_string())
            })?;
        Self::with_params(pepper, token_key, params)
    }

    /// Sealer with explicit Argon2 parameters. Tests use a tiny cost here.
    pub fn with_params(
        pepper: impl AsRef<[u8]>,
        token_key: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, CredentialSealerError> {
        let pepper = pepper.as_ref();
        if pepper.is_empty() {
            return Err(CredentialSealerError::EmptyPepper);
        }
        let token_key = token_key.as_ref();
        if token_key.is_empty() {
            return Err(CredentialSealerError::EmptyTokenKey);
        }

        Ok(Self {
            argon2: Argon2::new(
                Algorithm::Argon2id,
                Version::default(),
                params,
            ),
            pepper: Zeroizing::new(pepper.to_vec()),
            token_key: Zeroizing::new(token_key.to_vec()),
        })
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.pepper);
        material
    }

    /// Seal a raw password into a PHC-format credential.
    pub fn seal_password(
        &self,
        password: &str,
    ) -> Result<Credential, CredentialSealerError> {
        let mut salt = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| CredentialSealerError::Entropy(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt)?;

        let sealed = self
            .argon2
            .hash_password(&self.peppered(password), &salt)?
            .to_string();
        Ok(Credential::from_sealed(sealed))
    }

    /// Check a raw password against a sealed credential.
    pub fn verify_password(
        &self,
        password: &str,
        credential: &Credential,
    ) -> Result<bool, CredentialSealerError> {
        let parsed = PasswordHash::new(credential.as_sealed())?;
        Ok(self
            .argon2
            .verify_password(&self.peppered(password), &parsed)
            .is_ok())
    }

    /// Hex HMAC-SHA-256 digest of a bearer token, as persisted.
    pub fn digest_token(
        &self,
        token: &str,
    ) -> Result<String, CredentialSealerError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.token_key)
            .map_err(|err| {
                CredentialSealerError::InvalidParams(err.to_string())
            })?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Fresh random bearer token, hex encoded.
    pub fn issue_token(&self) -> Result<String, CredentialSealerError> {
        let mut bytes = Zeroizing::new([0u8; Self::TOKEN_BYTES]);
        OsRng
            .try_fill_bytes(&mut *bytes)
            .map_err(|err| CredentialSealerError::Entropy(err.to_string()))?;
        Ok(hex::encode(&*bytes))
    }
}
