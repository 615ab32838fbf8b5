use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rolodex_model::{Credential, Grant, Identity, ProfileDetails, Role};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::{conflict_or, text_uuid};
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
    id: String,
    username: String,
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
    identity_id: String,
    role: String,
}

/// SQLite-backed implementation of the `IdentityStore` port.
#[derive(Clone, Debug)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
    codec: ValueCodec,
}

impl SqliteIdentityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            codec: ValueCodec::new(BackendKind::Sqlite),
        }
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Grants keyed by the stored identity id. `None` loads every grant.
    async fn grants_for(
        &self,
        id: Option<&str>,
    ) -> Result<HashMap<String, Vec<Role>>> {
        let rows: Vec<GrantRecord> = match id {
            Some(id) => {
                sqlx::query_as(
                    "SELECT identity_id, role FROM grants \
                     WHERE identity_id = ? ORDER BY role",
                )
                .bind(id)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT identity_id, role FROM grants ORDER BY role",
                )
                .fetch_all(self.pool())
                .await?
            }
        };

        let mut grants: HashMap<String, Vec<Role>> = HashMap::new();
        for row in rows {
            let role = self.codec.decode_role(&row.role)?;
            grants.entry(row.identity_id).or_default().push(role);
        }
        Ok(grants)
    }

    fn hydrate(
        &self,
        record: IdentityRecord,
        grants: &mut HashMap<String, Vec<Role>>,
    ) -> Result<Identity> {
        let id = self.codec.decode_id(StoredValue::Text(record.id.clone()))?;
        let username = self
            .codec
            .decode_uuid(StoredValue::Text(record.username))?
            .ok_or_else(|| {
                RolodexError::Internal(format!("identity {id} has no handle"))
            })?;
        let roles = grants.remove(&record.id).unwrap_or_default();

        Ok(Identity {
            id,
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
            grants: roles
                .into_iter()
                .map(|role| Grant {
                    identity_id: id,
                    role,
                })
                .collect(),
        })
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        key: String,
    ) -> Result<Option<Identity>> {
        let sql = format!("{SELECT_IDENTITY} WHERE {predicate}");
        let record: Option<IdentityRecord> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };
        let mut grants = self.grants_for(Some(&record.id)).await?;
        self.hydrate(record, &mut grants).map(Some)
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>> {
        let key = text_uuid(self.codec.encode_uuid(Some(handle))?)?;
        self.fetch_one_where("i.username = ?", key).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let key = text_uuid(self.codec.encode_id(id)?)?;
        self.fetch_one_where("i.id = ?", key).await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        let records: Vec<IdentityRecord> = sqlx::query_as(SELECT_IDENTITY)
            .fetch_all(self.pool())
            .await?;
        let mut grants = self.grants_for(None).await?;
        records
            .into_iter()
            .map(|record| self.hydrate(record, &mut grants))
            .collect()
    }

    async fn insert(&self, identity: &Identity) -> Result<()> {
        let id = text_uuid(self.codec.encode_id(identity.id)?)?;
        let username =
            text_uuid(self.codec.encode_uuid(Some(&identity.username))?)?;
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
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&username)
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
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&details.name)
        .bind(&details.url)
        .bind(&details.bio)
        .bind(details.born)
        .bind(gender)
        .bind(details.modified)
        .execute(&mut *tx)
        .await?;

        for role in roles {
            sqlx::query("INSERT INTO grants (identity_id, role) VALUES (?, ?)")
                .bind(&id)
                .bind(role)
                .execute(&mut *tx)
                .await
                .map_err(|err| conflict_or(err, "grant"))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        let id = text_uuid(self.codec.encode_id(identity.id)?)?;
        let gender = self.codec.encode_gender(identity.details.gender)?;

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            "UPDATE identities SET email = ?, credential = ? WHERE id = ?",
        )
        .bind(&identity.email)
        .bind(identity.credential.as_sealed())
        .bind(&id)
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
            SET name = ?, url = ?, bio = ?, born = ?, gender = ?, modified = ?
            WHERE identity_id = ?
            "#,
        )
        .bind(&details.name)
        .bind(&details.url)
        .bind(&details.bio)
        .bind(details.born)
        .bind(gender)
        .bind(details.modified)
        .bind(&id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_with_role(&self, role: Role) -> Result<u64> {
        let key = self.codec.encode_role(role)?;
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM grants WHERE role = ?")
                .bind(key)
                .fetch_one(self.pool())
                .await?;
        Ok(count.max(0) as u64)
    }
}
