use crate::models::Config;

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

/// Non-fatal problems with a composed configuration.
pub fn collect_warnings(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.profile.is_production() {
        if config.auth.is_default_pepper() {
            warnings.push_with_hint(
                "AUTH_PASSWORD_PEPPER uses the default placeholder value",
                "Set AUTH_PASSWORD_PEPPER to a long random secret",
            );
        }
        if config.auth.is_default_token_key() {
            warnings.push_with_hint(
                "AUTH_TOKEN_KEY uses the default placeholder value",
                "Set AUTH_TOKEN_KEY to a long random secret",
            );
        }
        if config.database.url.is_none() {
            warnings.push_with_hint(
                "No database URL configured; identities live in memory and are lost on restart",
                "Set DATABASE_URL to a PostgreSQL connection string",
            );
        }
        if config.cors.is_wildcard_included() {
            warnings.push(
                "CORS allows any origin; restrict CORS_ALLOWED_ORIGINS in production",
            );
        }
    }

    warnings
}
