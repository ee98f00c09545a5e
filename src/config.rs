//! Console configuration.
//!
//! Holds optional overrides for the platform hosts and the profile
//! location. Stored at `~/.config/selldesk/config.json`; every field
//! has a compiled-in default, so a missing file is not an error.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/profile directory paths
const APP_NAME: &str = "selldesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Account host: login, identity and token refresh
const DEFAULT_ACCOUNT_BASE_URL: &str = "https://accounts.teemplatform.com/api";

/// Platform API host: merchant, catalog and order services
const DEFAULT_API_BASE_URL: &str = "https://api.teemplatform.com/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub account_base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub profile_dir: Option<PathBuf>,
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

    pub fn account_base_url(&self) -> &str {
        self.account_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ACCOUNT_BASE_URL)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Directory the durable profile lives in.
    pub fn profile_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.profile_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
