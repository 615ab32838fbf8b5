use std::fmt;

use crate::error::{Result, RolodexError};

/// Storage engine in use, derived from the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Postgres,
    MySql,
    Sqlite,
}

/// What a backend can store natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// The backend has a native UUID column type.
    pub native_uuid: bool,
}

impl BackendKind {
    /// Resolve the backend from a connection URL such as
    /// `postgresql://host/db`, `mysql://...` or `sqlite::memory:`.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| {
                RolodexError::InvalidValue(format!(
                    "database URL '{url}' has no scheme"
                ))
            })?;

        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "mysql" | "mariadb" => Ok(BackendKind::MySql),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(RolodexError::InvalidValue(format!(
                "unsupported database backend '{other}'"
            ))),
        }
    }

    pub const fn capabilities(self) -> BackendCapabilities {
        match self {
            BackendKind::Postgres => BackendCapabilities { native_uuid: true },
            BackendKind::MySql | BackendKind::Sqlite => {
                BackendCapabilities { native_uuid: false }
            }
        }
    }

    pub fn all() -> &'static [BackendKind] {
        &[BackendKind::Postgres, BackendKind::MySql, BackendKind::Sqlite]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgresql",
            BackendKind::MySql => "mysql",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
