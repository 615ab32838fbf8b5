//! Configuration loading for Rolodex.
//!
//! Values come from three layers, highest precedence first: process
//! environment (after an optional `.env` file), a TOML file, and the
//! defaults of the selected [`Profile`]. [`ConfigLoader::load`] composes
//! them and returns the resolved [`Config`] together with any non-fatal
//! [`ConfigWarnings`].

#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    LogConfig, Profile, ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
