//! Application configuration management.
//!
//! Configuration is stored at `~/.config/keywarden/config.json`. The API
//! base URL can also come from the `KEYWARDEN_API_URL` environment variable,
//! which wins over the config file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "keywarden";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Session state file name (token + expiry)
const SESSION_FILE: &str = "session.json";

/// Base URL used when neither the environment nor the config file sets one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for mutable state: the session file, logs, exports.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Path of the persisted session file.
    pub fn session_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SESSION_FILE))
    }

    /// Effective API base URL: environment, then config file, then default.
    pub fn api_url(&self) -> String {
        std::env::var("KEYWARDEN_API_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}
