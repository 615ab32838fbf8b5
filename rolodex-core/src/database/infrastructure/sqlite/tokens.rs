use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolodex_model::AccessToken;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{conflict_or, text_uuid};
use crate::codec::{BackendKind, StoredValue, ValueCodec};
use crate::database::ports::tokens::TokenStore;
use crate::error::Result;

/// SQLite-backed implementation of the `TokenStore` port.
///
/// Expiry is stored as epoch milliseconds so comparisons are numeric.
#[derive(Clone, Debug)]
pub struct SqliteTokenStore {
    pool: SqlitePool,
    codec: ValueCodec,
}

impl SqliteTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            codec: ValueCodec::new(BackendKind::Sqlite),
        }
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn issue(&self, token: &AccessToken) -> Result<()> {
        let owner = text_uuid(self.codec.encode_id(token.identity_id)?)?;
        sqlx::query(
            r#"
            INSERT INTO access_tokens (digest, identity_id, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&token.digest)
        .bind(owner)
        .bind(token.expires_at.timestamp_millis())
        .execute(self.pool())
        .await
        .map_err(|err| conflict_or(err, "access token"))?;
        Ok(())
    }

    async fn resolve(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let owner: Option<String> = sqlx::query_scalar(
            r#"
            SELECT identity_id FROM access_tokens
            WHERE digest = ? AND expires_at > ?
            "#,
        )
        .bind(digest)
        .bind(now.timestamp_millis())
        .fetch_optional(self.pool())
        .await?;

        owner
            .map(|text| self.codec.decode_id(StoredValue::Text(text)))
            .transpose()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM access_tokens WHERE expires_at <= ?")
                .bind(now.timestamp_millis())
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }
}
