use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub log: FileLogConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    /// Human-readable duration, e.g. `"1h"` or `"30m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
///
/// Values are kept raw where they still need validating, so a malformed
/// `SERVER_PORT` is reported instead of silently ignored.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub profile: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub auth_token_ttl: Option<String>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub application_log: Option<PathBuf>,
    pub access_log: Option<PathBuf>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            config_path: var("ROLODEX_CONFIG").map(PathBuf::from),
            profile: var("ROLODEX_PROFILE"),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT"),
            database_url: var("DATABASE_URL"),
            database_url_file: var("DATABASE_URL_FILE").map(PathBuf::from),
            auth_token_ttl: var("AUTH_TOKEN_TTL"),
            auth_password_pepper: var("AUTH_PASSWORD_PEPPER"),
            auth_token_key: var("AUTH_TOKEN_KEY"),
            application_log: var("APPLICATION_LOG").map(PathBuf::from),
            access_log: var("ACCESS_LOG").map(PathBuf::from),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS").map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_skips_blank_values_and_splits_csv() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SERVER_HOST", "  "),
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
        ]);
        let env =
            EnvConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env.server_host, None);
        assert_eq!(env.server_port.as_deref(), Some("8080"));
        assert_eq!(
            env.cors_allowed_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }
}
