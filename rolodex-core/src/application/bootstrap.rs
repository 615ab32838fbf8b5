//! First-run administrator provisioning.

use chrono::Utc;
use rolodex_model::{Identity, Role};
use tracing::{info, warn};

use crate::auth::CredentialSealer;
use crate::database::ports::IdentityStore;
use crate::error::{Result, RolodexError};

/// Create an identity holding the `admin` grant directly through the
/// store, bypassing the grant policy.
///
/// Refuses when an administrator already exists unless `force` is set.
pub async fn bootstrap_admin(
    store: &dyn IdentityStore,
    sealer: &CredentialSealer,
    email: &str,
    password: &str,
    force: bool,
) -> Result<Identity> {
    if email.is_empty() || password.is_empty() {
        return Err(RolodexError::BadRequest(
            "email and password must not be empty".to_string(),
        ));
    }

    let admins = store.count_with_role(Role::Admin).await?;
    if admins > 0 {
        if !force {
            return Err(RolodexError::Conflict(
                "an administrator already exists".to_string(),
            ));
        }
        warn!(existing = admins, "Creating an additional administrator");
    }

    let mut identity =
        Identity::new(email, sealer.seal_password(password)?, Utc::now());
    identity.grant(Role::Admin);
    store.insert(&identity).await?;

    info!(handle = %identity.username, "Bootstrapped administrator");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use argon2::Params;

    use super::*;
    use crate::codec::BackendKind;
    use crate::database::infrastructure::memory::InMemoryIdentityStore;

    fn sealer() -> CredentialSealer {
        CredentialSealer::with_params(
            "pepper",
            "key",
            Params::new(8, 1, 1, Some(32)).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn refuses_second_admin_without_force() {
        let store = InMemoryIdentityStore::new(BackendKind::Postgres);
        let sealer = sealer();

        let first = bootstrap_admin(&store, &sealer, "a@b.com", "pw", false)
            .await
            .unwrap();
        assert!(first.has_role(Role::Admin));

        assert!(matches!(
            bootstrap_admin(&store, &sealer, "c@d.com", "pw", false).await,
            Err(RolodexError::Conflict(_))
        ));

        bootstrap_admin(&store, &sealer, "c@d.com", "pw", true)
            .await
            .unwrap();
        assert_eq!(store.count_with_role(Role::Admin).await.unwrap(), 2);
    }
}
