// Per-user credential storage.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = ".gemcommit.json";
const API_KEY_PREFIX: &str = "AIza";
const API_KEY_LEN: usize = 39;
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    /// Loads the config at `path`. A missing file yields an empty config.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the config to `path` atomically, readable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(data.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        restrict_permissions(file.path()).map_err(write_err)?;
        file.persist(path).map_err(|err| write_err(err.error))?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Location of the per-user config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join(CONFIG_FILE_NAME))
}

/// Google AI API keys start with "AIza" and are 39 characters long.
pub fn is_valid_api_key(api_key: &str) -> bool {
    api_key.len() == API_KEY_LEN
        && api_key.starts_with(API_KEY_PREFIX)
        && api_key.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Trims `raw` and checks it against the key format.
pub fn validate_api_key(raw: &str) -> Result<String, ConfigError> {
    let api_key = raw.trim();
    if api_key.is_empty() {
        return Err(ConfigError::EmptyKey);
    }
    if !is_valid_api_key(api_key) {
        return Err(ConfigError::InvalidKeyFormat);
    }
    Ok(api_key.to_string())
}

/// Validates `raw` and stores it in the config at `path`.
pub fn set_api_key(path: &Path, raw: &str) -> Result<(), ConfigError> {
    let api_key = validate_api_key(raw)?;
    let mut config = Config::load_from(path)?;
    config.api_key = Some(api_key);
    config.save_to(path)
}

/// Environment variables win over the config file.
pub fn resolve_api_key(path: &Path) -> Result<String, ConfigError> {
    for key in API_KEY_ENV_VARS {
        if let Ok(value) = env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                debug!(source = key, "using API key from environment");
                return Ok(trimmed.to_string());
            }
        }
    }

    Config::load_from(path)?
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingKey)
}
