use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolodex_model::AccessToken;
use uuid::Uuid;

use crate::error::Result;

/// Bearer token digests and the identities they authenticate.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn issue(&self, token: &AccessToken) -> Result<()>;

    /// Owner of a live token. Expired or unknown digests resolve to `None`.
    async fn resolve(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    /// Drop every token expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
