//! Loading and validation of settings.
//!
//! Every setting has a default, so a configuration file is optional. Values defined in the
//! configuration file can be overridden by environment variables. An example of a configuration
//! file can be found in the `configs/` directory located in the repository root.

use std::{fmt, path::Path};

use config::{Config, ConfigError, Environment};
use redis::{ConnectionInfo, IntoConnectionInfo};
use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize,
};
use thiserror::Error;
use tracing_subscriber::filter::EnvFilter;
use validator::{Validate, ValidationErrors};

#[cfg(test)]
mod tests;

/// The prefix of environment variables overriding settings.
const ENV_PREFIX: &str = "rollcall";

#[derive(Error, Debug)]
/// An error related to loading and validation of settings.
pub enum SettingsError {
    #[error("configuration loading failed: {0}")]
    Loading(#[from] ConfigError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

#[derive(Debug, Validate, Deserialize)]
/// The combined settings.
///
/// Each section in the configuration file corresponds to the identically named settings field.
pub struct Settings {
    #[validate]
    pub redis: RedisSettings,
    pub log: LoggingSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
}

impl Settings {
    /// Loads and validates the settings, optionally from a configuration file.
    ///
    /// # Errors
    /// Fails when the loading of the configuration file or its validation failed.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<Self, SettingsError> {
        let settings: Settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        config.set_default("redis.url", "redis://127.0.0.1/")?;
        config.set_default("redis.key", "students")?;
        config.set_default("log.filter", "warn")?;
        if let Some(path) = path {
            config.merge(config::File::from(path.as_ref()))?;
        }
        config.merge(Environment::with_prefix(ENV_PREFIX).separator("__"))?;
        config.try_into()
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Redis settings.
pub struct RedisSettings {
    /// The URL where Redis is running.
    ///
    /// The format of the URL is `redis://[<username>][:<passwd>@]<hostname>[:port][/<db>]`.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [redis]
    /// url = "redis://127.0.0.1/"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// ROLLCALL_REDIS__URL=redis://127.0.0.1/
    /// ```
    #[serde(deserialize_with = "deserialize_redis_url")]
    pub url: ConnectionInfo,

    /// The key of the hash that holds the roster.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [redis]
    /// key = "students"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// ROLLCALL_REDIS__KEY=students
    /// ```
    #[validate(length(min = 1))]
    pub key: String,
}

fn deserialize_redis_url<'de, D>(deserializer: D) -> Result<ConnectionInfo, D::Error>
where
    D: Deserializer<'de>,
{
    struct ConnectionInfoVisitor;

    impl<'de> Visitor<'de> for ConnectionInfoVisitor {
        type Value = ConnectionInfo;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(
                formatter,
                "redis://[<username>][:<passwd>@]<hostname>[:port][/<db>]"
            )
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .into_connection_info()
                .map_err(|_| de::Error::invalid_value(serde::de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_str(ConnectionInfoVisitor)
}

#[derive(Debug, Default, Deserialize, Clone, Copy)]
/// Selection settings.
pub struct SelectionSettings {
    /// The seed of the random generator used to score students. Leave this out to seed the
    /// generator from the operating system, which makes every run different.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [selection]
    /// seed = 42
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// ROLLCALL_SELECTION__SEED=42
    /// ```
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
/// Logging settings.
pub struct LoggingSettings {
    /// A comma-separated list of logging directives. More information about logging directives
    /// can be found [here].
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [log]
    /// filter = "info"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// ROLLCALL_LOG__FILTER=info
    /// ```
    ///
    /// [here]: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives
    #[serde(deserialize_with = "deserialize_env_filter")]
    pub filter: EnvFilter,
}

fn deserialize_env_filter<'de, D>(deserializer: D) -> Result<EnvFilter, D::Error>
where
    D: Deserializer<'de>,
{
    struct EnvFilterVisitor;

    impl<'de> Visitor<'de> for EnvFilterVisitor {
        type Value = EnvFilter;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a valid tracing filter directive: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            EnvFilter::try_new(value)
                .map_err(|_| de::Error::invalid_value(serde::de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_str(EnvFilterVisitor)
}
