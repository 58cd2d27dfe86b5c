use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Config;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration found at {0} (set `path` there, or point $TODOS_CONFIG at a config file)")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the config file path: $TODOS_CONFIG, else XDG_CONFIG_HOME, else
/// ~/.config.
pub fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var("TODOS_CONFIG") {
        return PathBuf::from(explicit);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("todos").join("config.toml")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Expand a leading `~` to the user's home directory
pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" {
        dirs_home()
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs_home().join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Load the configuration from the default location.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the configuration from a specific path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Where the index cache lives: the configured `cache_path` if set, else
/// $XDG_CACHE_HOME/todos/index.json, else ~/.cache/todos/index.json.
pub fn cache_path(config: &Config) -> PathBuf {
    if let Some(ref explicit) = config.cache_path {
        return expand_user(explicit);
    }
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".cache"));
    cache_dir.join("todos").join("index.json")
}
