use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{
    PgPool, SqlitePool,
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::codec::BackendKind;
use crate::error::{Result, RolodexError};

const MAX_CONNECTIONS: u32 = 10;
const MIN_CONNECTIONS: u32 = 1;
const SQLITE_MAX_CONNECTIONS: u32 = 4;

/// A connection pool for one of the SQL adapters.
#[derive(Clone, Debug)]
pub enum DatabasePool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DatabasePool {
    pub fn size(&self) -> u32 {
        match self {
            DatabasePool::Postgres(pool) => pool.size(),
            DatabasePool::Sqlite(pool) => pool.size(),
        }
    }
}

/// The storage backend chosen at startup together with the unit of work
/// built on top of it.
#[derive(Clone)]
pub struct DatabaseContext {
    backend: BackendKind,
    pool: Option<DatabasePool>,
    unit_of_work: Arc<AppUnitOfWork>,
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("backend", &self.backend)
            .field("pool_size", &self.pool.as_ref().map(DatabasePool::size))
            .field("unit_of_work_ptr", &Arc::as_ptr(&self.unit_of_work))
            .finish()
    }
}

impl DatabaseContext {
    /// Pick adapters for `url`.
    ///
    /// No URL, `sqlite::memory:` and a bare `sqlite://` select the in-memory
    /// store. PostgreSQL URLs and file-backed SQLite URLs open a pool.
    /// Anything else is rejected.
    pub async fn connect(url: Option<&str>) -> Result<Self> {
        let Some(url) = url else {
            return Ok(Self::in_memory(BackendKind::Sqlite));
        };

        match BackendKind::from_url(url)? {
            BackendKind::Postgres => Self::connect_postgres(url).await,
            BackendKind::Sqlite if is_memory_sqlite(url) => {
                Ok(Self::in_memory(BackendKind::Sqlite))
            }
            BackendKind::Sqlite => Self::connect_sqlite(url).await,
            other => Err(RolodexError::InvalidValue(format!(
                "unsupported database backend '{other}' in {}",
                redact(url)
            ))),
        }
    }

    /// Open a PostgreSQL pool and compose the Postgres unit of work.
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(MIN_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await
            .map_err(|e| {
                RolodexError::Internal(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            MAX_CONNECTIONS, MIN_CONNECTIONS
        );

        Ok(Self::from_pool(pool))
    }

    /// Open (creating if needed) a SQLite database file.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| {
                RolodexError::InvalidValue(format!(
                    "invalid SQLite URL {}: {}",
                    redact(url),
                    e
                ))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| {
                RolodexError::Internal(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            "SQLite pool initialized with max_connections={}",
            SQLITE_MAX_CONNECTIONS
        );

        Ok(Self::from_sqlite_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            backend: BackendKind::Postgres,
            unit_of_work: Arc::new(AppUnitOfWork::from_postgres(pool.clone())),
            pool: Some(DatabasePool::Postgres(pool)),
        }
    }

    pub fn from_sqlite_pool(pool: SqlitePool) -> Self {
        Self {
            backend: BackendKind::Sqlite,
            unit_of_work: Arc::new(AppUnitOfWork::from_sqlite(pool.clone())),
            pool: Some(DatabasePool::Sqlite(pool)),
        }
    }

    pub fn in_memory(backend: BackendKind) -> Self {
        info!(backend = %backend, "Using in-memory store");
        Self {
            backend,
            pool: None,
            unit_of_work: Arc::new(AppUnitOfWork::in_memory(backend)),
        }
    }

    /// Apply the embedded migrations for the pool's engine. A no-op for
    /// the in-memory store.
    pub async fn migrate(&self) -> Result<()> {
        let outcome = match &self.pool {
            None => {
                info!("In-memory store needs no migrations");
                return Ok(());
            }
            Some(DatabasePool::Postgres(pool)) => {
                crate::POSTGRES_MIGRATOR.run(pool).await
            }
            Some(DatabasePool::Sqlite(pool)) => {
                crate::SQLITE_MIGRATOR.run(pool).await
            }
        };

        outcome.map_err(|e| {
            RolodexError::Internal(format!("Migration failed: {}", e))
        })?;
        info!(backend = %self.backend, "Database migrations applied");
        Ok(())
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    pub fn unit_of_work(&self) -> Arc<AppUnitOfWork> {
        Arc::clone(&self.unit_of_work)
    }
}

fn is_memory_sqlite(url: &str) -> bool {
    matches!(url, "sqlite::memory:" | "sqlite://" | "sqlite:")
}

/// Strip credentials before a URL ends up in an error message.
fn redact(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://***@{host}"),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}
