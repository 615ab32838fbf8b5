use std::{fs::read_to_string, path::Path};

use url::Url;

use crate::{
    ConfigLoadError,
    models::sources::{EnvConfig, FileDatabaseConfig},
};

/// Effective database URL: `DATABASE_URL`, then `DATABASE_URL_FILE`, then
/// the file's `database.url`, then its `database.url_file`.
///
/// Every candidate is checked to be a well-formed URL. Whether the scheme
/// is supported is decided later, when the store is opened.
pub fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    let candidate = if let Some(url) = env.database_url.clone() {
        Some(url)
    } else if let Some(path) = env.database_url_file.as_ref() {
        read_secret_file(path)?
    } else if let Some(url) = file_database
        .url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        Some(url)
    } else if let Some(path) = file_database.url_file.as_ref() {
        read_secret_file(path)?
    } else {
        None
    };

    candidate
        .map(|url| {
            let trimmed = url.trim().to_string();
            Url::parse(&trimmed)
                .map(|_| trimmed)
                .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })
        })
        .transpose()
}

pub fn read_secret_file(
    path: &Path,
) -> Result<Option<String>, ConfigLoadError> {
    let contents =
        read_to_string(path).map_err(|source| ConfigLoadError::SecretFileIo {
            path: path.to_path_buf(),
            source,
        })?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn env_url_wins_over_file() {
        let env = EnvConfig {
            database_url: Some("postgres://env/db".into()),
            ..EnvConfig::default()
        };
        let file = FileDatabaseConfig {
            url: Some("postgres://file/db".into()),
            url_file: None,
        };
        assert_eq!(
            resolve_database_url(&env, &file).unwrap().as_deref(),
            Some("postgres://env/db")
        );
    }

    #[test]
    fn secret_file_is_trimmed() {
        let mut secret = tempfile::NamedTempFile::new().unwrap();
        writeln!(secret, "  postgresql://u:p@localhost/rolodex  ").unwrap();

        let env = EnvConfig {
            database_url_file: Some(secret.path().to_path_buf()),
            ..EnvConfig::default()
        };
        assert_eq!(
            resolve_database_url(&env, &FileDatabaseConfig::default())
                .unwrap()
                .as_deref(),
            Some("postgresql://u:p@localhost/rolodex")
        );
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let env = EnvConfig {
            database_url: Some("not a url".into()),
            ..EnvConfig::default()
        };
        assert!(matches!(
            resolve_database_url(&env, &FileDatabaseConfig::default()),
            Err(ConfigLoadError::InvalidDatabaseUrl { .. })
        ));
    }

    #[test]
    fn sqlite_memory_url_is_well_formed() {
        let env = EnvConfig {
            database_url: Some("sqlite::memory:".into()),
            ..EnvConfig::default()
        };
        assert!(
            resolve_database_url(&env, &FileDatabaseConfig::default()).is_ok()
        );
    }
}
