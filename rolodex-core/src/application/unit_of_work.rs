use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use sqlx::{PgPool, SqlitePool};

use crate::codec::BackendKind;
use crate::database::infrastructure::memory::{
    InMemoryIdentityStore, InMemoryTokenStore,
};
use crate::database::infrastructure::postgres::{
    PostgresIdentityStore, PostgresTokenStore,
};
use crate::database::infrastructure::sqlite::{
    SqliteIdentityStore, SqliteTokenStore,
};
use crate::database::ports::{IdentityStore, TokenStore};

/// Every repository port the application services use.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub identities: Arc<dyn IdentityStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("identities", &type_name_of_val(self.identities.as_ref()))
            .field("tokens", &type_name_of_val(self.tokens.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self { identities, tokens }
    }

    /// PostgreSQL adapters sharing one pool.
    pub fn from_postgres(pool: PgPool) -> Self {
        Self {
            identities: Arc::new(PostgresIdentityStore::new(pool.clone())),
            tokens: Arc::new(PostgresTokenStore::new(pool)),
        }
    }

    /// SQLite adapters sharing one pool.
    pub fn from_sqlite(pool: SqlitePool) -> Self {
        Self {
            identities: Arc::new(SqliteIdentityStore::new(pool.clone())),
            tokens: Arc::new(SqliteTokenStore::new(pool)),
        }
    }

    /// In-process adapters storing rows as `backend` would.
    pub fn in_memory(backend: BackendKind) -> Self {
        Self {
            identities: Arc::new(InMemoryIdentityStore::new(backend)),
            tokens: Arc::new(InMemoryTokenStore::new()),
        }
    }
}
