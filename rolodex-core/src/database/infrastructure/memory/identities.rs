use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rolodex_model::{Credential, Grant, Identity, ProfileDetails, Role};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::codec::{BackendKind, StoredValue, ValueCodec};
use crate::database::ports::identities::IdentityStore;
use crate::error::{Result, RolodexError};

#[derive(Debug, Clone)]
struct IdentityRow {
    id: StoredValue,
    username: StoredValue,
    email: String,
    credential: String,
    created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DetailsRow {
    identity_id: StoredValue,
    name: Option<String>,
    url: Option<String>,
    bio: Option<String>,
    born: Option<NaiveDate>,
    gender: Option<&'static str>,
    modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct GrantRow {
    identity_id: StoredValue,
    role: &'static str,
}

#[derive(Debug, Default)]
struct Tables {
    identities: Vec<IdentityRow>,
    details: Vec<DetailsRow>,
    grants: Vec<GrantRow>,
}

/// [`IdentityStore`] over in-process tables.
///
/// One write lock covers all three tables, which makes `insert` and `save`
/// atomic with respect to every reader.
#[derive(Debug)]
pub struct InMemoryIdentityStore {
    codec: ValueCodec,
    tables: RwLock<Tables>,
}

impl InMemoryIdentityStore {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            codec: ValueCodec::new(backend),
            tables: RwLock::new(Tables::default()),
        }
    }

    fn details_row(
        &self,
        identity_id: StoredValue,
        details: &ProfileDetails,
    ) -> Result<DetailsRow> {
        Ok(DetailsRow {
            identity_id,
            name: details.name.clone(),
            url: details.url.clone(),
            bio: details.bio.clone(),
            born: details.born,
            gender: self.codec.encode_gender(details.gender)?,
            modified: details.modified,
        })
    }

    fn hydrate(&self, tables: &Tables, row: &IdentityRow) -> Result<Identity> {
        let id = self.codec.decode_id(row.id.clone())?;
        let username =
            self.codec.decode_uuid(row.username.clone())?.ok_or_else(|| {
                RolodexError::Internal(format!("identity {id} has no handle"))
            })?;

        let details = tables
            .details
            .iter()
            .find(|details| details.identity_id == row.id)
            .ok_or_else(|| {
                RolodexError::Internal(format!(
                    "identity {id} has no profile details"
                ))
            })?;

        let grants = tables
            .grants
            .iter()
            .filter(|grant| grant.identity_id == row.id)
            .map(|grant| {
                Ok(Grant {
                    identity_id: id,
                    role: self.codec.decode_role(grant.role)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Identity {
            id,
            username,
            email: row.email.clone(),
            credential: Credential::from_sealed(row.credential.clone()),
            created: row.created,
            details: ProfileDetails {
                name: details.name.clone(),
                url: details.url.clone(),
                bio: details.bio.clone(),
                born: details.born,
                gender: self.codec.decode_gender(details.gender)?,
                modified: details.modified,
            },
            grants,
        })
    }

    async fn find_where(
        &self,
        column: impl Fn(&IdentityRow) -> &StoredValue,
        key: StoredValue,
    ) -> Result<Option<Identity>> {
        let tables = self.tables.read().await;
        tables
            .identities
            .iter()
            .find(|row| *column(row) == key)
            .map(|row| self.hydrate(&tables, row))
            .transpose()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>> {
        let key = self.codec.encode_uuid(Some(handle))?;
        self.find_where(|row| &row.username, key).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let key = self.codec.encode_id(id)?;
        self.find_where(|row| &row.id, key).await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        let tables = self.tables.read().await;
        tables
            .identities
            .iter()
            .map(|row| self.hydrate(&tables, row))
            .collect()
    }

    async fn insert(&self, identity: &Identity) -> Result<()> {
        // Encode everything before taking the lock so a bad value leaves
        // the tables untouched.
        let id = self.codec.encode_id(identity.id)?;
        let identity_row = IdentityRow {
            id: id.clone(),
            username: self.codec.encode_uuid(Some(&identity.username))?,
            email: identity.email.clone(),
            credential: identity.credential.as_sealed().to_string(),
            created: identity.created,
        };
        let details_row = self.details_row(id.clone(), &identity.details)?;
        let grant_rows = identity
            .grants
            .iter()
            .map(|grant| {
                Ok(GrantRow {
                    identity_id: id.clone(),
                    role: self.codec.encode_role(grant.role)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tables = self.tables.write().await;
        if tables.identities.iter().any(|row| row.id == identity_row.id) {
            return Err(RolodexError::Conflict(format!(
                "identity {} already exists",
                identity.id
            )));
        }
        if tables
            .identities
            .iter()
            .any(|row| row.username == identity_row.username)
        {
            return Err(RolodexError::Conflict(format!(
                "handle {} already exists",
                identity.username
            )));
        }

        tables.identities.push(identity_row);
        tables.details.push(details_row);
        tables.grants.extend(grant_rows);
        Ok(())
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        let id = self.codec.encode_id(identity.id)?;
        let details_row = self.details_row(id.clone(), &identity.details)?;

        let mut tables = self.tables.write().await;
        let identity_index = tables
            .identities
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| {
                RolodexError::NotFound(format!(
                    "identity {} does not exist",
                    identity.id
                ))
            })?;
        let details_index = tables
            .details
            .iter()
            .position(|row| row.identity_id == id)
            .ok_or_else(|| {
                RolodexError::Internal(format!(
                    "identity {} has no profile details",
                    identity.id
                ))
            })?;

        let row = &mut tables.identities[identity_index];
        row.email = identity.email.clone();
        row.credential = identity.credential.as_sealed().to_string();
        tables.details[details_index] = details_row;
        Ok(())
    }

    async fn count_with_role(&self, role: Role) -> Result<u64> {
        let key = self.codec.encode_role(role)?;
        let tables = self.tables.read().await;
        Ok(tables.grants.iter().filter(|grant| grant.role == key).count()
            as u64)
    }
}
