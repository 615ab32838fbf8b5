use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolodex_model::AccessToken;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_or;
use crate::database::ports::tokens::TokenStore;
use crate::error::Result;

/// PostgreSQL-backed implementation of the `TokenStore` port.
#[derive(Clone, Debug)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn issue(&self, token: &AccessToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (digest, identity_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.digest)
        .bind(token.identity_id)
        .bind(token.expires_at)
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
        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT identity_id FROM access_tokens
            WHERE digest = $1 AND expires_at > $2
            "#,
        )
        .bind(digest)
        .bind(now)
        .fetch_optional(self.pool())
        .await?;
        Ok(owner)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM access_tokens WHERE expires_at <= $1")
                .bind(now)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }
}
