use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use kaleido_utils::DEFAULT_FILE_NAME_PREFIX;

pub const DEFAULT_MODEL: &str = "dall-e-3";
pub const DEFAULT_DEFAULT_FLAGS: &str = "";
const CONFIG_DIR_NAME: &str = ".kaleido";
const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_KEYS: [&str; 3] = ["model", "file_name_prefix", "default_flags"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    ConfigDirUnavailable,
    #[error("failed to read or write configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize configuration: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image model named in every planned request.
    pub model: String,
    /// First component of planned image file names.
    pub file_name_prefix: String,
    /// Inline flags applied before the flags typed with a prompt,
    /// e.g. `-quality hd -style natural`.
    pub default_flags: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            file_name_prefix: DEFAULT_FILE_NAME_PREFIX.to_string(),
            default_flags: DEFAULT_DEFAULT_FLAGS.to_string(),
        }
    }
}

/// Loads the Kaleido configuration from disk, creating a default file if absent.
///
/// An existing file missing any known key is rewritten with that key filled in.
pub fn load_or_init() -> Result<LoadOutcome, ConfigError> {
    let path = config_file_path()?;

    if path.exists() {
        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        let table: toml::Table = toml::from_str(&contents)?;
        let backfilled = CONFIG_KEYS.iter().any(|key| !table.contains_key(*key));
        if backfilled {
            save(&config, &path)?;
        }
        Ok(LoadOutcome {
            config,
            path,
            created: false,
            backfilled,
        })
    } else {
        let config = Config::default();
        save(&config, &path)?;
        Ok(LoadOutcome {
            config,
            path,
            created: true,
            backfilled: false,
        })
    }
}

/// Persist the given Kaleido configuration to disk at the provided path.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    ensure_parent_exists(path)?;
    let serialized = toml::to_string_pretty(config)?;
    fs::write(path, serialized)?;
    Ok(())
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub config: Config,
    pub path: PathBuf,
    pub created: bool,
    pub backfilled: bool,
}

fn ensure_parent_exists(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn config_file_path() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::ConfigDirUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests;
