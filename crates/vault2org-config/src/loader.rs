//! Config file loading

use crate::config::Config;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `~/.config/vault2org/config.toml` (platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vault2org").join("config.toml"))
}

impl Config {
    /// Load configuration
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is tried and built-in defaults are used when it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load and validate a specific TOML file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let config = config.normalize();
        config.validate()?;
        Ok(config)
    }
}
