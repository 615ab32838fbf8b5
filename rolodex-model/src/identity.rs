use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{gender::Gender, role::Role};

/// Sealed password material. The model never sees the raw password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap an already sealed credential (e.g. an Argon2 PHC string).
    pub fn from_sealed(sealed: impl Into<String>) -> Self {
        Self(sealed.into())
    }

    /// The sealed form, as persisted.
    pub fn as_sealed(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<sealed>)")
    }
}

/// A user account.
///
/// `username` is the external handle callers address the account by; `id`
/// is the internal surrogate key. Both are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential: Credential,
    pub created: DateTime<Utc>,
    pub details: ProfileDetails,
    pub grants: Vec<Grant>,
}

impl Identity {
    /// Build a fresh identity with an empty profile and no grants.
    ///
    /// The handle is a random v4 UUID rendered as 32 hex digits.
    pub fn new(
        email: impl Into<String>,
        credential: Credential,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: Uuid::new_v4().simple().to_string(),
            email: email.into(),
            credential,
            created: now,
            details: ProfileDetails::empty(now),
            grants: Vec::new(),
        }
    }

    /// Check if the identity holds a grant for `role`
    pub fn has_role(&self, role: Role) -> bool {
        self.grants.iter().any(|grant| grant.role == role)
    }

    /// Roles held, in grant order.
    pub fn roles(&self) -> Vec<Role> {
        self.grants.iter().map(|grant| grant.role).collect()
    }

    /// Add a grant. Grants are additive; granting a held role is a no-op.
    pub fn grant(&mut self, role: Role) {
        if !self.has_role(role) {
            self.grants.push(Grant {
                identity_id: self.id,
                role,
            });
        }
    }
}

/// Profile attributes owned by exactly one [`Identity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub name: Option<String>,
    pub url: Option<String>,
    pub bio: Option<String>,
    pub born: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub modified: DateTime<Utc>,
}

impl ProfileDetails {
    /// A profile with every optional attribute absent.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            name: None,
            url: None,
            bio: None,
            born: None,
            gender: None,
            modified: now,
        }
    }
}

/// Assignment of a [`Role`] to an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub identity_id: Uuid,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new("a@b.com", Credential::from_sealed("sealed"), Utc::now())
    }

    #[test]
    fn handle_is_simple_hex() {
        let identity = identity();
        assert_eq!(identity.username.len(), 32);
        assert!(identity.username.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(identity.username, identity.id.simple().to_string());
    }

    #[test]
    fn grants_are_additive_and_deduplicated() {
        let mut identity = identity();
        assert!(identity.roles().is_empty());

        identity.grant(Role::User);
        identity.grant(Role::User);
        identity.grant(Role::Admin);

        assert_eq!(identity.roles(), vec![Role::User, Role::Admin]);
        assert!(identity.grants.iter().all(|g| g.identity_id == identity.id));
    }

    #[test]
    fn credential_is_redacted_in_debug_and_skipped_in_json() {
        let identity = identity();
        let debug = format!("{:?}", identity);
        assert!(!debug.contains("\"sealed\""));

        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("credential").is_none());
    }
}
