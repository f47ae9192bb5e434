//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Platform API configuration.
    #[serde(default)]
    pub api: Api,

    /// Session storage configuration.
    #[serde(default)]
    pub storage: Storage,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Platform API configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Api {
    /// Base URL of the platform REST API.
    #[default("http://localhost:5000/api".to_owned())]
    pub base_url: String,

    /// Timeout of a single API request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,

    /// Timeout of a gallery upload.
    #[default(time::Duration::from_secs(10 * 60))]
    #[serde(with = "humantime_serde")]
    pub upload_timeout: time::Duration,
}

impl From<&Api> for service::infra::api::http::Config {
    fn from(value: &Api) -> Self {
        Self {
            base_url: value.base_url.clone(),
            timeout: value.timeout,
        }
    }
}

impl From<&Api> for service::Config {
    fn from(value: &Api) -> Self {
        Self {
            upload_timeout: value.upload_timeout,
        }
    }
}

/// Session storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Path to the file the durable scope is persisted into.
    #[default(PathBuf::from("session.json"))]
    pub durable_path: PathBuf,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    Info,

    /// Designates hazardous situations.
    #[default]
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{io::Write as _, time::Duration};

    use super::{Config, LogLevel};

    #[test]
    fn uses_defaults_without_file() {
        let conf = Config::new("definitely-missing-config").unwrap();

        assert_eq!(conf.api.base_url, "http://localhost:5000/api");
        assert_eq!(conf.api.timeout, Duration::from_secs(30));
        assert_eq!(conf.api.upload_timeout, Duration::from_secs(600));
        assert_eq!(conf.storage.durable_path.to_str(), Some("session.json"));
        assert!(matches!(conf.log.level, LogLevel::Warn));
    }

    #[test]
    fn reads_humantime_durations() {
        let mut file =
            tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://api.dettyfusion.com/api\"\n\
             upload_timeout = \"15m\"\n\n[log]\nlevel = \"DEBUG\"",
        )
        .unwrap();

        let conf = Config::new(file.path().to_str().unwrap()).unwrap();

        assert_eq!(conf.api.base_url, "https://api.dettyfusion.com/api");
        assert_eq!(conf.api.upload_timeout, Duration::from_secs(15 * 60));
        assert_eq!(conf.api.timeout, Duration::from_secs(30));
        assert!(matches!(conf.log.level, LogLevel::Debug));
    }
}
