use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rolodex_model::{Credential, Grant, Identity, ProfileDetails, Role};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_or, native_uuid};
use crate::codec::{BackendKind, StoredValue, ValueCodec};
use crate::database::ports::identities::IdentityStore;
use crate::error::{Result, RolodexError};

const SELECT_IDENTITY: &str = r#"
    SELECT
        i.id, i.username, i.email, i.credential, i.created,
        d.name, d.url, d.bio, d.born, d.gender, d.modified
    FROM identities i
    JOIN profile_details d ON d.identity_id = i.id
"#;

#[derive(Debug, FromRow)]
struct IdentityRecord {
    id: Uuid,
    username: Uuid,
    email: String,
    credential: String,
    created: DateTime<Utc>,
    name: Option<String>,
    url: Option<String>,
    bio: Option<String>,
    born: Option<NaiveDate>,
    gender: Option<String>,
    modified: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct GrantRecord {
    identity_id: Uuid,
    role: String,
}

/// PostgreSQL-backed implementation of the `IdentityStore` port.
#[derive(Clone, Debug)]
pub struct PostgresIdentityStore {
    pool: PgPool,
    codec: ValueCodec,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            codec: ValueCodec::new(BackendKind::Postgres),
        }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn grants_for(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Grant>>> {
        let rows: Vec<GrantRecord> = sqlx::query_as(
            r#"
            SELECT identity_id, role FROM grants
            WHERE identity_id = ANY($1)
            ORDER BY role
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await?;

        let mut grants: HashMap<Uuid, Vec<Grant>> = HashMap::new();
        for row in rows {
            grants.entry(row.identity_id).or_default().push(Grant {
                identity_id: row.identity_id,
                role: self.codec.decode_role(&row.role)?,
            });
        }
        Ok(grants)
    }

    fn hydrate(
        &self,
        record: IdentityRecord,
        grants: &mut HashMap<Uuid, Vec<Grant>>,
    ) -> Result<Identity> {
        let username = self
            .codec
            .decode_uuid(StoredValue::Uuid(record.username))?
            .ok_or_else(|| {
                RolodexError::Internal(format!(
                    "identity {} has no handle",
                    record.id
                ))
            })?;

        Ok(Identity {
            id: record.id,
            username,
            email: record.email,
            credential: Credential::from_sealed(record.credential),
            created: record.created,
            details: ProfileDetails {
                name: record.name,
                url: record.url,
                bio: record.bio,
                born: record.born,
                gender: self.codec.decode_gender(record.gender.as_deref())?,
                modified: record.modified,
            },
            grants: grants.remove(&record.id).unwrap_or_default(),
        })
    }

    async fn hydrate_all(
        &self,
        records: Vec<IdentityRecord>,
    ) -> Result<Vec<Identity>> {
        let ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        let mut grants = self.grants_for(&ids).await?;
        records
            .into_iter()
            .map(|record| self.hydrate(record, &mut grants))
            .collect()
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        key: Uuid,
    ) -> Result<Option<Identity>> {
        let sql = format!("{SELECT_IDENTITY} WHERE {predicate}");
        let record: Option<IdentityRecord> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match record {
            Some(record) => {
                Ok(self.hydrate_all(vec![record]).await?.into_iter().next())
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>> {
        let key = native_uuid(self.codec.encode_uuid(Some(handle))?)?;
        self.fetch_one_where("i.username = $1", key).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let key = native_uuid(self.codec.encode_id(id)?)?;
        self.fetch_one_where("i.id = $1", key).await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        let records: Vec<IdentityRecord> = sqlx::query_as(SELECT_IDENTITY)
            .fetch_all(self.pool())
            .await?;
        self.hydrate_all(records).await
    }

    async fn insert(&self, identity: &Identity) -> Result<()> {
        let id = native_uuid(self.codec.encode_id(identity.id)?)?;
        let username =
            native_uuid(self.codec.encode_uuid(Some(&identity.username))?)?;
        let gender = self.codec.encode_gender(identity.details.gender)?;
        let roles = identity
            .grants
            .iter()
            .map(|grant| self.codec.encode_role(grant.role))
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO identities (id, username, email, credential, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(&identity.email)
        .bind(identity.credential.as_sealed())
        .bind(identity.created)
        .execute(&mut *tx)
        .await
        .map_err(|err| conflict_or(err, "identity"))?;

        let details = &identity.details;
        sqlx::query(
            r#"
            INSERT INTO profile_details
                (identity_id, name, url, bio, born, gender, modified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.url)
        .bind(&details.bio)
        .bind(details.born)
        .bind(gender)
        .bind(details.modified)
        .execute(&mut *tx)
        .await?;

        for role in roles {
            sqlx::query(
                "INSERT INTO grants (identity_id, role) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(|err| conflict_or(err, "grant"))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        let id = native_uuid(self.codec.encode_id(identity.id)?)?;
        let gender = self.codec.encode_gender(identity.details.gender)?;

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            "UPDATE identities SET email = $2, credential = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(&identity.email)
        .bind(identity.credential.as_sealed())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RolodexError::NotFound(format!(
                "identity {} does not exist",
                identity.id
            )));
        }

        let details = &identity.details;
        sqlx::query(
            r#"
            UPDATE profile_details
            SET name = $2, url = $3, bio = $4, born = $5, gender = $6,
                modified = $7
            WHERE identity_id = $1
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.url)
        .bind(&details.bio)
        .bind(details.born)
        .bind(gender)
        .bind(details.modified)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_with_role(&self, role: Role) -> Result<u64> {
        let key = self.codec.encode_role(role)?;
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM grants WHERE role = $1")
                .bind(key)
                .fetch_one(self.pool())
                .await?;
        Ok(count.max(0) as u64)
    }
}
