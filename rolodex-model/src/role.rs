use serde::{Deserialize, Serialize};

use crate::{choice::Choice, error::ModelError};

/// Permission level carried by a [`Grant`](crate::Grant).
///
/// `Admin` is a superset of every other role; the policy layer relies on
/// that rather than on any ordering between variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every identity.
    Admin,

    /// Access to the caller's own identity only.
    #[default]
    User,
}

impl Choice for Role {
    const SET_NAME: &'static str = "role";
    const ALL: &'static [Self] = &[Role::Admin, Role::User];

    fn key(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl Role {
    /// Get the role label as a string
    pub fn as_str(&self) -> &'static str {
        self.label()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_label(s).ok_or_else(|| ModelError::UnknownLabel {
            set: Self::SET_NAME,
            label: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::User.as_str(), "user");

        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
    }

    #[test]
    fn labels_match_exactly() {
        assert!("Admin".parse::<Role>().is_err());
        assert!("administrator".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn storage_keys_are_distinct_from_labels() {
        assert_eq!(Role::from_key("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_key("admin"), None);
        assert_eq!(Role::table(), vec![("ADMIN", "admin"), ("USER", "user")]);
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
