use std::time::Duration;

/// Placeholder pepper used when none is configured. Fine for development,
/// flagged in production.
pub const DEFAULT_PASSWORD_PEPPER: &str = "rolodex-development-pepper";

/// Placeholder token HMAC key used when none is configured.
pub const DEFAULT_TOKEN_KEY: &str = "rolodex-development-token-key";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Database URL the `testing` profile falls back to.
pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";
