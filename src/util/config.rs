//! Configuration file support for xnative.
//!
//! Two configuration file locations are read:
//! - Global: `~/.xnative/config.toml` - User-wide defaults
//! - Project: `.xnative/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Properties from the
//! manifest and from `-P key=value` on the command line are layered on top
//! by the build operation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// xnative configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project properties (e.g. `cmake.executable`)
    pub properties: BTreeMap<String, String>,

    /// Android toolchain settings
    pub android: AndroidConfig,
}

/// Android-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AndroidConfig {
    /// NDK root used when the manifest does not name one
    pub ndk_directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.properties.extend(other.properties);

        if other.android.ndk_directory.is_some() {
            self.android.ndk_directory = other.android.ndk_directory;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xnative/config.toml)
/// 2. Global config (~/.xnative/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global xnative config directory (~/.xnative).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".xnative"))
}

/// Get the project config path (.xnative/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xnative").join("config.toml")
}

/// Parse a `key=value` property override.
pub fn parse_property(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid property `{}`; expected `key=value`", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid property `{}`; the key is empty", raw);
    }
    Ok((key.to_string(), value.to_string()))
}
