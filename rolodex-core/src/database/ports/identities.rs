use async_trait::async_trait;
use rolodex_model::{Identity, Role};
use uuid::Uuid;

use crate::error::Result;

/// Storage for identities together with their profile and grants.
///
/// `insert` and `save` are each one unit of work: either every row they
/// touch is written or none is.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up by external handle. A handle that is not a valid UUID fails
    /// with `InvalidValue`.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    /// Every identity. No ordering guarantee.
    async fn list(&self) -> Result<Vec<Identity>>;

    /// Persist a new identity, its profile and its grants. A duplicate id
    /// or handle fails with `Conflict`.
    async fn insert(&self, identity: &Identity) -> Result<()>;

    /// Persist the mutable parts of an existing identity: email, credential
    /// and profile. Grants are left alone.
    async fn save(&self, identity: &Identity) -> Result<()>;

    async fn count_with_role(&self, role: Role) -> Result<u64>;
}
