//! # rb-config
//!
//! Layered settings for the board sync client. Later layers win:
//!
//! 1. built-in defaults
//! 2. `board-sync.toml` (optional, working directory)
//! 3. `RB_*` environment variables, after loading `.env` if present
//!
//! Nested keys use a double underscore: `RB_LOG__FORMAT=json`.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use url::Url;

pub const ENV_PREFIX: &str = "RB";
pub const CONFIG_FILE: &str = "board-sync";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid database url {url}: {reason}")]
    InvalidUrl { url: Url, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Base URL of the document store, e.g. `https://<project>.firebaseio.com`.
    pub database_url: Url,
    pub request_timeout_secs: u64,
    /// Database credential appended to every request.
    #[serde(default, deserialize_with = "optional_secret")]
    pub auth_token: Option<SecretString>,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            // A missing .env is the normal case outside development.
            tracing::trace!(%err, "no .env loaded");
        }
        Self::from_environment(None)
    }

    /// Builds settings from the layered sources. `env` replaces the process
    /// environment when given.
    pub fn from_environment(env: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .set_default("request_timeout_secs", 10_i64)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    // Parsing already happened during deserialization; only the scheme is left.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.database_url.scheme() {
            "http" | "https" => Ok(()),
            _ => Err(ConfigError::InvalidUrl {
                url: self.database_url.clone(),
                reason: "scheme must be http or https",
            }),
        }
    }
}

fn optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}
