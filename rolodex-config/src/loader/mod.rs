pub mod db_url;
pub mod error;

use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

use self::error::ConfigLoadError;
use crate::constants::{
    DEFAULT_HOST, DEFAULT_PASSWORD_PEPPER, DEFAULT_PORT, DEFAULT_TOKEN_KEY,
    DEFAULT_TOKEN_TTL, IN_MEMORY_DATABASE_URL,
};
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    LogConfig, Profile, ServerConfig,
};
use crate::validation::{self, ConfigWarnings};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("rolodex.toml"),
        PathBuf::from("config/rolodex.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
    env: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options, env: None }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Use `env` instead of reading the process environment. No `.env` file
    /// is loaded in this mode.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        debug!(path = %path.display(), "Loaded configuration file");
        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No rolodex.toml detected; using environment variables and profile defaults",
            "Set ROLODEX_CONFIG or create rolodex.toml to pin settings",
        );
    }

    let FileConfig {
        profile: file_profile,
        server: file_server,
        database: file_database,
        auth: file_auth,
        log: file_log,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let profile = match env.profile.as_deref().or(file_profile.as_deref()) {
        Some(raw) => raw.parse::<Profile>()?,
        None => Profile::default(),
    };

    let port = match env.server_port.as_deref() {
        Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
            ConfigLoadError::InvalidPort {
                value: raw.to_string(),
            }
        })?,
        None => file_server.port.unwrap_or(DEFAULT_PORT),
    };
    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
    };

    let mut url = db_url::resolve_database_url(&env, &file_database)?;
    if url.is_none() && profile == Profile::Testing {
        url = Some(IN_MEMORY_DATABASE_URL.to_string());
    }
    let database = DatabaseConfig { url };

    let token_ttl = match env.auth_token_ttl.or(file_auth.token_ttl) {
        Some(raw) => parse_duration("auth.token_ttl", &raw)?,
        None => DEFAULT_TOKEN_TTL,
    };
    let auth = AuthConfig {
        token_ttl,
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
        token_key: env
            .auth_token_key
            .or(file_auth.token_key)
            .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
    };

    let log = LogConfig {
        application: env.application_log.or(file_log.application),
        access: env.access_log.or(file_log.access),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let config = Config {
        profile,
        server,
        database,
        auth,
        log,
        cors,
        metadata,
    };

    warnings.extend(validation::collect_warnings(&config));

    Ok((config, warnings))
}

fn parse_duration(
    field: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|source| {
        ConfigLoadError::InvalidDuration {
            field,
            value: raw.to_string(),
            source,
        }
    })
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
