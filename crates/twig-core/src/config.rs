use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TwigConfig {
    pub version: u32,
    #[serde(default)]
    pub dialog: DialogConfig,
}

impl Default for TwigConfig {
    fn default() -> Self {
        Self {
            version: 1,
            dialog: DialogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DialogConfig {
    #[serde(default)]
    pub platform_style: PlatformStyle,
}

/// Casing applied to dialog titles and button labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStyle {
    Capitalized,
    Lowercase,
}

impl Default for PlatformStyle {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Capitalized
        } else {
            Self::Lowercase
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("twig")
        .join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<TwigConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: TwigConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

/// Loads the config when the file exists and falls back to defaults otherwise.
pub fn load_config_or_default(path: &Path) -> Result<TwigConfig, ConfigError> {
    if !path.exists() {
        return Ok(TwigConfig::default());
    }

    load_config(path)
}

pub fn validate_config(config: &TwigConfig) -> Result<(), ConfigError> {
    if config.version != 1 {
        return Err(ConfigError::Validation {
            message: "version must be 1".to_string(),
        });
    }

    Ok(())
}
