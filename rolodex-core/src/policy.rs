//! Role-based authorization.
//!
//! Every decision the resource makes about who may do what goes through
//! [`GrantPolicy::authorize`]. Controllers never inspect grants themselves.

use rolodex_model::{Identity, Role};
use tracing::debug;

use crate::error::{Result, RolodexError};

/// Reason carried by every denial.
pub const DENY_REASON: &str =
    "only admins and data owners may perform this action";

/// Operations exposed by the user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Detail,
    Create,
    Update,
}

impl Operation {
    /// Roles allowed to attempt the operation. Holding `User` only helps a
    /// caller acting on their own identity.
    pub fn required_roles(self) -> &'static [Role] {
        match self {
            Operation::List | Operation::Create => &[Role::Admin],
            Operation::Detail | Operation::Update => &[Role::Admin, Role::User],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Detail => "detail",
            Operation::Create => "create",
            Operation::Update => "update",
        }
    }
}

/// Why a request was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// The caller holds an admin grant.
    Admin,
    /// The caller is the target identity.
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Basis),
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrantPolicy;

impl GrantPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `caller` may act on `target`.
    ///
    /// Admins are allowed unconditionally. Otherwise the caller must be
    /// the target and the operation must admit `User`. Operations without
    /// a target are admin-only.
    pub fn authorize(
        &self,
        caller: &Identity,
        required: &[Role],
        target: Option<&Identity>,
    ) -> Decision {
        if caller.has_role(Role::Admin) {
            return Decision::Allow(Basis::Admin);
        }

        let self_service = required.contains(&Role::User)
            && caller.has_role(Role::User)
            && target.is_some_and(|target| target.id == caller.id);

        if self_service {
            Decision::Allow(Basis::Owner)
        } else {
            Decision::Deny(DENY_REASON)
        }
    }

    /// [`GrantPolicy::authorize`] for a resource operation, with a denial
    /// turned into [`RolodexError::Unauthorized`].
    pub fn enforce(
        &self,
        caller: &Identity,
        operation: Operation,
        target: Option<&Identity>,
    ) -> Result<Basis> {
        let decision =
            self.authorize(caller, operation.required_roles(), target);
        debug!(
            caller = %caller.username,
            operation = operation.as_str(),
            target = target.map(|t| t.username.as_str()),
            ?decision,
            "authorization decision"
        );

        match decision {
            Decision::Allow(basis) => Ok(basis),
            Decision::Deny(reason) => {
                Err(RolodexError::Unauthorized(reason.to_string()))
            }
        }
    }
}
