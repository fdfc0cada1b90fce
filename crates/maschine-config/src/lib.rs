//! Settings for Maschine plugin tooling
//!
//! Values resolve in three layers: built-in defaults, then an optional TOML
//! file, then environment variables. The file lives at `$MASCHINE_CONFIG`
//! when that is set, otherwise at `<config dir>/maschine/config.toml`.

use maschine_manifest::{DEFAULT_MANIFEST_FILE, SCHEMA_URL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "MASCHINE_CONFIG";
pub const LOG_LEVEL_ENV: &str = "MASCHINE_PLUGIN_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "MASCHINE_LOG_FORMAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown log format '{0}', expected 'compact' or 'json'")]
    UnknownLogFormat(String),
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::UnknownLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `maschine_sdk=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ManifestSettings {
    pub file_name: String,
    pub schema_url: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        ManifestSettings {
            file_name: DEFAULT_MANIFEST_FILE.to_string(),
            schema_url: SCHEMA_URL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub manifest: ManifestSettings,
}

impl Settings {
    /// Location of the settings file, if one can be determined
    pub fn path() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join("maschine").join("config.toml"))
    }

    /// Resolve settings from the default file location and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Settings::load_from(Settings::path().as_deref())
    }

    /// Resolve settings from `path` (skipped when absent) and the process environment
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) if path.is_file() => {
                Some(
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?,
                )
            }
            _ => None,
        };
        Settings::resolve(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Layer file contents and environment lookups over the defaults
    pub fn resolve<F>(file_contents: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match file_contents {
            Some(text) => toml::from_str(text)?,
            None => Settings::default(),
        };
        settings.apply_env(env)?;
        Ok(settings)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = non_empty(LOG_LEVEL_ENV) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(format) = non_empty(LOG_FORMAT_ENV) {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }
}
