//! The user resource: list, detail, create and update.
//!
//! Every operation authorizes through [`GrantPolicy`] before touching the
//! store, and every profile attribute it reads or writes goes through the
//! [`FieldMap`]. Failures are returned untouched; rendering them is the
//! transport's job.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rolodex_model::{Choice, Identity, Role};
use serde_json::Value;
use tracing::info;

use crate::auth::CredentialSealer;
use crate::database::ports::IdentityStore;
use crate::error::{Result, RolodexError};
use crate::field_map::{FieldMap, FieldValue};
use crate::payload::Payload;
use crate::policy::{Basis, GrantPolicy, Operation};

/// External names a caller may set on the profile.
const PROFILE_FIELDS: &[&str] = &["name", "url", "bio", "born", "gender"];

pub struct ResourceController {
    store: Arc<dyn IdentityStore>,
    sealer: Arc<CredentialSealer>,
    fields: Arc<FieldMap>,
    policy: GrantPolicy,
}

impl fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceController")
            .field("store", &std::any::type_name_of_val(self.store.as_ref()))
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl ResourceController {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        sealer: Arc<CredentialSealer>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            sealer,
            fields: Arc::new(FieldMap::for_identity()?),
            policy: GrantPolicy::new(),
        })
    }

    /// External representation: every mapped field plus `roles`.
    pub fn render(&self, identity: &Identity) -> Result<Value> {
        let mut rendered = self.fields.render(identity)?;
        let roles = identity
            .roles()
            .into_iter()
            .map(|role| Value::String(role.label().to_string()))
            .collect();
        rendered.insert("roles".to_string(), Value::Array(roles));
        Ok(Value::Object(rendered))
    }

    /// Every identity. Admin only.
    pub async fn list(&self, caller: &Identity) -> Result<Vec<Identity>> {
        self.policy.enforce(caller, Operation::List, None)?;
        self.store.list().await
    }

    /// One identity by handle.
    ///
    /// Admins may look up anyone and get `None` when nothing matches.
    /// Anyone else may only look up themselves.
    pub async fn detail(
        &self,
        caller: &Identity,
        handle: &str,
    ) -> Result<Option<Identity>> {
        let target = (caller.username == handle).then_some(caller);
        match self.policy.enforce(caller, Operation::Detail, target)? {
            Basis::Admin => self.store.find_by_handle(handle).await,
            Basis::Owner => Ok(Some(caller.clone())),
        }
    }

    /// Create an identity with its profile and a single grant. Admin only.
    ///
    /// `email` and `password` are required; `role` defaults to `user`.
    pub async fn create(
        &self,
        caller: &Identity,
        payload: &Payload,
    ) -> Result<Identity> {
        self.policy.enforce(caller, Operation::Create, None)?;

        let email = payload.required_text("email")?;
        let password = payload.required_text("password")?;
        let profile = self.stage_profile(payload)?;
        let role = match payload.non_empty_text("role")? {
            None => Role::default(),
            Some(label) => Role::from_label(label).ok_or_else(|| {
                RolodexError::BadRequest(format!("Unknown role {label}"))
            })?,
        };

        let credential = self.sealer.seal_password(password)?;
        let mut identity = Identity::new(email, credential, Utc::now());
        for (name, value) in profile {
            self.fields.write(&mut identity, name, value)?;
        }
        identity.grant(role);

        self.store.insert(&identity).await?;
        info!(handle = %identity.username, %role, "Created identity");
        Ok(identity)
    }

    /// Patch the password and profile of an existing identity.
    ///
    /// Fields missing from the payload, or set to `null`, keep their current
    /// value. Everything supplied is validated before anything is changed.
    pub async fn update(
        &self,
        caller: &Identity,
        handle: &str,
        payload: &Payload,
    ) -> Result<Identity> {
        let mut target =
            self.store.find_by_handle(handle).await?.ok_or_else(|| {
                RolodexError::NotFound(
                    "Cannot update non existing object".to_string(),
                )
            })?;

        self.policy.enforce(caller, Operation::Update, Some(&target))?;

        let profile = self.stage_profile(payload)?;
        let credential = payload
            .non_empty_text("password")?
            .map(|password| self.sealer.seal_password(password))
            .transpose()?;

        for (name, value) in profile {
            self.fields.write(&mut target, name, value)?;
        }
        if let Some(credential) = credential {
            target.credential = credential;
        }
        self.fields.write(
            &mut target,
            "modified",
            FieldValue::Timestamp(Utc::now()),
        )?;

        self.store.save(&target).await?;
        info!(
            handle = %target.username,
            by = %caller.username,
            "Updated identity"
        );
        Ok(target)
    }

    /// Parse every supplied profile field up front.
    fn stage_profile(
        &self,
        payload: &Payload,
    ) -> Result<Vec<(&'static str, FieldValue)>> {
        let mut staged = Vec::new();
        for name in PROFILE_FIELDS {
            let Some(raw) = payload.get(name) else {
                continue;
            };
            // An empty gender is treated as not supplied.
            if *name == "gender" && raw.as_str() == Some("") {
                continue;
            }
            let attribute = self.fields.resolve(name)?.attribute();
            staged.push((*name, FieldValue::from_external(attribute, raw)?));
        }
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use argon2::Params;
    use rolodex_model::{Credential, Gender};
    use serde_json::json;

    use super::*;
    use crate::codec::BackendKind;
    use crate::database::infrastructure::memory::InMemoryIdentityStore;

    fn controller() -> (ResourceController, Arc<InMemoryIdentityStore>) {
        let store = Arc::new(InMemoryIdentityStore::new(BackendKind::Sqlite));
        let sealer = CredentialSealer::with_params(
            "pepper",
            "key",
            Params::new(8, 1, 1, Some(32)).unwrap(),
        )
        .unwrap();
        let controller =
            ResourceController::new(store.clone(), Arc::new(sealer)).unwrap();
        (controller, store)
    }

    fn caller(role: Role) -> Identity {
        let mut identity = Identity::new(
            "caller@example.com",
            Credential::from_sealed("sealed"),
            Utc::now(),
        );
        identity.grant(role);
        identity
    }

    fn payload(value: Value) -> Payload {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_seals_password_and_writes_profile() {
        let (controller, _) = controller();
        let admin = caller(Role::Admin);

        let created = controller
            .create(
                &admin,
                &payload(json!({
                    "email": "a@b.com",
                    "password": "x",
                    "name": "Ada",
                    "born": "1815-12-10",
                    "gender": "female",
                })),
            )
            .await
            .unwrap();

        assert_ne!(created.credential.as_sealed(), "x");
        assert_eq!(created.details.name.as_deref(), Some("Ada"));
        assert_eq!(created.details.gender, Some(Gender::Female));
        assert_eq!(created.roles(), vec![Role::User]);
    }

    #[tokio::test]
    async fn create_rejects_unknown_role() {
        let (controller, store) = controller();
        let err = controller
            .create(
                &caller(Role::Admin),
                &payload(json!({
                    "email": "a@b.com",
                    "password": "x",
                    "role": "root",
                })),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unknown role root");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn role_matching_uses_lowercase_labels_only() {
        let (controller, store) = controller();
        for key in ["ADMIN", "User"] {
            let err = controller
                .create(
                    &caller(Role::Admin),
                    &payload(json!({
                        "email": "a@b.com",
                        "password": "x",
                        "role": key,
                    })),
                )
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), format!("Unknown role {key}"));
        }
        assert!(store.list().await.unwrap().is_empty());

        let created = controller
            .create(
                &caller(Role::Admin),
                &payload(json!({
                    "email": "a@b.com",
                    "password": "x",
                    "role": "admin",
                })),
            )
            .await
            .unwrap();
        assert_eq!(created.roles(), vec![Role::Admin]);
    }

    #[tokio::test]
    async fn render_uses_external_names() {
        let (controller, _) = controller();
        let identity = caller(Role::Admin);
        let rendered = controller.render(&identity).unwrap();

        assert_eq!(rendered["id"], json!(identity.username));
        assert_eq!(rendered["roles"], json!(["admin"]));
        assert!(rendered.get("password").is_none());
        assert!(rendered.get("credential").is_none());
    }

    #[tokio::test]
    async fn update_refreshes_modified() {
        let (controller, _) = controller();
        let admin = caller(Role::Admin);
        let created = controller
            .create(
                &admin,
                &payload(json!({ "email": "a@b.com", "password": "x" })),
            )
            .await
            .unwrap();

        let updated = controller
            .update(&admin, &created.username, &payload(json!({})))
            .await
            .unwrap();
        assert!(updated.details.modified >= created.details.modified);
        assert_eq!(updated.credential, created.credential);
    }
}
