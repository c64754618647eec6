//! TOML-based application configuration.
//!
//! Stored at `~/.config/tickdown/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::DEFAULT_RETRY_CAP;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tickdown/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minutes used by `restart` when no previous duration is known.
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    /// Backward-retry budget for wake-up scheduling.
    #[serde(default = "default_retry_cap")]
    pub wakeup_retry_cap: u32,
}

fn default_minutes() -> u32 {
    25
}
fn default_retry_cap() -> u32 {
    DEFAULT_RETRY_CAP
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            wakeup_retry_cap: default_retry_cap(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| match e {
            ConfigError::LoadFailed { path, message } => ConfigError::SaveFailed { path, message },
            other => other,
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.default_minutes, 25);
        assert_eq!(cfg.wakeup_retry_cap, 10);
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config::default();
        cfg.default_minutes = 15;
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.default_minutes, 15);
        assert_eq!(back.wakeup_retry_cap, 10);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let back: Config = toml::from_str("default_minutes = 5\n").unwrap();
        assert_eq!(back.default_minutes, 5);
        assert_eq!(back.wakeup_retry_cap, 10);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config {
            default_minutes: 40,
            wakeup_retry_cap: 3,
        };
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let back: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.default_minutes, 40);
        assert_eq!(back.wakeup_retry_cap, 3);
    }
}
