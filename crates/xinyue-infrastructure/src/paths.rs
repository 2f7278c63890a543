//! Path management for xinyue configuration files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where xinyue keeps its files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/xinyue/            # Config directory (platform specific)
/// └── config.toml              # Engine configuration
/// ```
pub struct XinyuePaths;

impl XinyuePaths {
    const APP_DIR: &'static str = "xinyue";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Returns the xinyue configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(Self::CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_under_app_dir() {
        if let Ok(path) = XinyuePaths::config_file() {
            assert!(path.ends_with("xinyue/config.toml"));
        }
    }
}
