//! Configuration for the Tether context carrier.
//!
//! Settings come from the `[carrier]` table of `~/.tether/config.toml`,
//! then the `TETHER_ASYNC_CONTEXT` environment variable overrides the file.
//! A missing file is not an error; an unreadable or malformed one is logged
//! and ignored by [`CarrierConfig::resolve`].

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides [`CarrierConfig::async_context`].
pub const ASYNC_CONTEXT_ENV: &str = "TETHER_ASYNC_CONTEXT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown async context mode {value:?} (expected auto or disabled)")]
pub struct ParseModeError {
    value: String,
}

/// Whether the carrier may use native context propagation.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AsyncContextMode {
    /// Use native propagation when the runtime supports it.
    #[default]
    Auto,
    /// Always build the degraded carrier.
    Disabled,
}

impl AsyncContextMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for AsyncContextMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "enabled" | "on" | "1" | "true" => Ok(Self::Auto),
            "disabled" | "off" | "0" | "false" => Ok(Self::Disabled),
            _ => Err(ParseModeError {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct CarrierConfig {
    #[serde(default)]
    pub async_context: AsyncContextMode,
}

impl CarrierConfig {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            async_context: AsyncContextMode::Disabled,
        }
    }

    /// Config file settings with the environment override applied.
    ///
    /// Never fails: file problems are logged and the defaults are used.
    #[must_use]
    pub fn resolve() -> Self {
        let base = match TetherConfig::load() {
            Ok(Some(config)) => config.carrier.unwrap_or_default(),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(path = %err.path().display(), "Ignoring carrier config: {err}");
                Self::default()
            }
        };
        base.with_env_override(env::var(ASYNC_CONTEXT_ENV).ok().as_deref())
    }

    /// Applies a raw `TETHER_ASYNC_CONTEXT` value. Unknown values are ignored.
    #[must_use]
    pub fn with_env_override(self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return self;
        };
        match raw.parse() {
            Ok(async_context) => Self { async_context },
            Err(err) => {
                tracing::warn!("Ignoring {ASYNC_CONTEXT_ENV}: {err}");
                self
            }
        }
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.async_context == AsyncContextMode::Disabled
    }
}

/// Top-level layout of `config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct TetherConfig {
    pub carrier: Option<CarrierConfig>,
}

impl TetherConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Loads `path`, returning `Ok(None)` when it does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tether").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{AsyncContextMode, CarrierConfig, ConfigError, TetherConfig};

    #[test]
    fn mode_parses_aliases() {
        let parse = |raw: &str| raw.parse::<AsyncContextMode>().unwrap();
        assert_eq!(parse("AUTO"), AsyncContextMode::Auto);
        assert_eq!(parse(" on "), AsyncContextMode::Auto);
        assert_eq!(parse("True"), AsyncContextMode::Auto);
        assert_eq!(parse("false"), AsyncContextMode::Disabled);
        assert_eq!(parse("off"), AsyncContextMode::Disabled);
        assert_eq!(parse("0"), AsyncContextMode::Disabled);
        assert!("sometimes".parse::<AsyncContextMode>().is_err());
    }

    #[test]
    fn env_override_replaces_file_value() {
        let config = CarrierConfig::default().with_env_override(Some("disabled"));
        assert!(config.is_disabled());

        let config = CarrierConfig::disabled().with_env_override(Some("auto"));
        assert_eq!(config.async_context, AsyncContextMode::Auto);
    }

    #[test]
    fn blank_or_unknown_env_value_is_ignored() {
        let config = CarrierConfig::disabled().with_env_override(Some("  "));
        assert!(config.is_disabled());
        let config = CarrierConfig::disabled().with_env_override(Some("maybe"));
        assert!(config.is_disabled());
        let config = CarrierConfig::default().with_env_override(None);
        assert_eq!(config, CarrierConfig::default());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TetherConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn reads_carrier_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[carrier]\nasync_context = \"disabled\"\n").unwrap();

        let loaded = TetherConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.carrier, Some(CarrierConfig::disabled()));
    }

    #[test]
    fn empty_file_has_no_carrier_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let loaded = TetherConfig::load_from(&path).unwrap().unwrap();
        assert!(loaded.carrier.is_none());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[carrier]\nasync_context = \"sideways\"\n").unwrap();

        let err = TetherConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
