//! Engine configuration file storage.
//!
//! Loads `EngineConfig` from `~/.config/xinyue/config.toml` (or an explicit
//! path) and layers environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};

use xinyue_core::config::EngineConfig;
use xinyue_core::error::{Result, XinyueError};

use crate::paths::XinyuePaths;

pub const ENV_BASE_URL: &str = "XINYUE_BASE_URL";
pub const ENV_API_KEY: &str = "XINYUE_API_KEY";
pub const ENV_LICENSE: &str = "XINYUE_LICENSE";

/// Storage for the engine configuration file.
///
/// Responsibilities:
/// - Read and parse the TOML file
/// - Fall back to defaults when the file is missing or empty
/// - Apply environment overrides and validate the result
///
/// Does NOT write the file or watch it for changes.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage pointing at the default config path.
    pub fn new() -> Result<Self> {
        let path = XinyuePaths::config_file().map_err(|e| XinyueError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing or `--config`).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file without environment overrides.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load_file(&self) -> Result<EngineConfig> {
        if !self.path.exists() {
            tracing::debug!("Config file {:?} not found, using defaults", self.path);
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            XinyueError::io(format!("Failed to read config file at {:?}: {}", self.path, e))
        })?;

        if content.trim().is_empty() {
            tracing::warn!("Config file {:?} is empty, using defaults", self.path);
            return Ok(EngineConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Reads the file, applies environment overrides and validates.
    pub fn load(&self) -> Result<EngineConfig> {
        let config = apply_env_overrides(self.load_file()?, |key| std::env::var(key).ok());
        let config = config.validated()?;

        tracing::info!(
            "Loaded config from {:?} (base_url={}, transfer={})",
            self.path,
            config.base_url,
            if config.transfer_active() { "enabled" } else { "disabled" }
        );
        Ok(config)
    }
}

/// Overrides file values with non-empty environment values.
pub fn apply_env_overrides<F>(mut config: EngineConfig, lookup: F) -> EngineConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = non_empty(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(api_key) = non_empty(ENV_API_KEY) {
        config.api_key = api_key;
    }
    if let Some(license) = non_empty(ENV_LICENSE) {
        config.license_token = Some(license);
    }
    config
}
