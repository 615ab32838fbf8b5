use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use rolodex_config::{ConfigLoadError, ConfigLoader, EnvConfig, Profile};
use tempfile::NamedTempFile;

fn env(pairs: &[(&str, &str)]) -> EnvConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|key| vars.get(key).cloned())
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_apply_without_file_or_env() {
    let load = ConfigLoader::new().with_env(env(&[])).load().unwrap();
    let config = load.config;

    assert_eq!(config.profile, Profile::Development);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.database.url, None);
    assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
    assert!(config.cors.allowed_origins.is_empty());
    assert!(config.metadata.config_path.is_none());
    assert!(
        load.warnings
            .iter()
            .any(|w| w.message.contains("No rolodex.toml detected"))
    );
}

#[test]
fn environment_overrides_file() {
    let file = config_file(
        r#"
profile = "development"

[server]
host = "127.0.0.1"
port = 8080

[database]
url = "postgres://file@localhost/rolodex"

[auth]
token_ttl = "30m"
"#,
    );

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env(env(&[
            ("SERVER_PORT", "9090"),
            ("DATABASE_URL", "postgres://env@localhost/rolodex"),
        ]))
        .load()
        .unwrap()
        .config;

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.database.url.as_deref(),
        Some("postgres://env@localhost/rolodex")
    );
    assert_eq!(config.auth.token_ttl, Duration::from_secs(30 * 60));
    assert_eq!(config.metadata.config_path.as_deref(), Some(file.path()));
}

#[test]
fn malformed_port_is_reported() {
    let err = ConfigLoader::new()
        .with_env(env(&[("SERVER_PORT", "eighty")]))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::InvalidPort { value } if value == "eighty"));
}

#[test]
fn malformed_token_ttl_is_reported() {
    let err = ConfigLoader::new()
        .with_env(env(&[("AUTH_TOKEN_TTL", "soon")]))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::InvalidDuration { field: "auth.token_ttl", .. }
    ));
}

#[test]
fn unknown_profile_is_rejected() {
    let err = ConfigLoader::new()
        .with_env(env(&[("ROLODEX_PROFILE", "staging")]))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::UnknownProfile { .. }));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let err = ConfigLoader::new()
        .with_config_path("/definitely/not/here/rolodex.toml")
        .with_env(env(&[]))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn unparsable_file_is_an_error() {
    let file = config_file("[server\nport = ");
    let err = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env(env(&[]))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}

#[test]
fn testing_profile_falls_back_to_in_memory_store() {
    let config = ConfigLoader::new()
        .with_env(env(&[("ROLODEX_PROFILE", "test")]))
        .load()
        .unwrap()
        .config;
    assert_eq!(config.profile, Profile::Testing);
    assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
}

#[test]
fn production_defaults_raise_warnings() {
    let load = ConfigLoader::new()
        .with_env(env(&[
            ("ROLODEX_PROFILE", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com, *"),
        ]))
        .load()
        .unwrap();

    let messages: Vec<&str> =
        load.warnings.iter().map(|w| w.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("AUTH_PASSWORD_PEPPER")));
    assert!(messages.iter().any(|m| m.contains("AUTH_TOKEN_KEY")));
    assert!(messages.iter().any(|m| m.contains("No database URL")));
    assert!(messages.iter().any(|m| m.contains("CORS allows any origin")));
    assert_eq!(
        load.config.cors.allowed_origins,
        vec!["https://app.example.com".to_string(), "*".to_string()]
    );
}

#[test]
fn production_with_secrets_is_quiet() {
    let file = config_file("profile = \"production\"\n");
    let load = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env(env(&[
            ("AUTH_PASSWORD_PEPPER", "a-long-random-pepper"),
            ("AUTH_TOKEN_KEY", "a-long-random-key"),
            ("DATABASE_URL", "postgres://localhost/rolodex"),
        ]))
        .load()
        .unwrap();
    assert!(load.warnings.is_empty(), "{:?}", load.warnings);
}
