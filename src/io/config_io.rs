use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::config::BoardConfig;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "ghboard.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parse config text
pub fn parse_config(text: &str, path: &Path) -> Result<BoardConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the board config.
///
/// An explicit path must exist. Without one, `ghboard.toml` in `dir` is
/// used when present and defaults apply otherwise.
pub fn read_config(explicit: Option<&Path>, dir: &Path) -> Result<BoardConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (dir.join(CONFIG_FILE), false),
    };
    if !required && !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(BoardConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config = parse_config(&text, &path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}
