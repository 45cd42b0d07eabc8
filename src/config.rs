//! Configuration management for forgevault
//!
//! Locates the global credential store and the per-project store directory,
//! and holds the HTTP settings used when testing credentials against a host.
//! Supports Windows, macOS, and Linux.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::HttpSettings;

/// Environment variable that overrides the config directory
pub const HOME_ENV: &str = "FORGEVAULT_HOME";

const CONFIG_FILE: &str = "config.json";
const CREDENTIALS_DIR: &str = "credentials";

/// Vault configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Global store directory; defaults to `<config dir>/credentials`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_dir: Option<PathBuf>,
    /// Directory created inside a project to hold its store
    #[serde(default = "default_project_dir_name")]
    pub project_dir_name: String,
    /// Timeout for credential checks, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// User-Agent sent to hosting providers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_project_dir_name() -> String {
    ".forgevault".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    HttpSettings::default().user_agent
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            global_dir: None,
            project_dir_name: default_project_dir_name(),
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl VaultConfig {
    /// Gets the config directory path (cross-platform)
    pub fn config_dir() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(home));
        }

        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|p| PathBuf::from(p).join("forgevault"))
        }

        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|p| PathBuf::from(p).join("Library/Application Support/forgevault"))
        }

        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
                .map(|p| p.join("forgevault"))
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Loads configuration from the config directory
    ///
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Saves configuration to the config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config path")?;
        self.save_to(&path)
    }

    /// Saves configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Root of the global credential store
    pub fn global_store_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.global_dir {
            return Ok(dir.clone());
        }
        Self::config_dir()
            .map(|dir| dir.join(CREDENTIALS_DIR))
            .context("Could not determine config directory")
    }

    /// Root of the credential store for a project directory
    pub fn project_store_root(&self, project_dir: impl Into<PathBuf>) -> PathBuf {
        project_dir
            .into()
            .join(&self.project_dir_name)
            .join(CREDENTIALS_DIR)
    }

    /// HTTP settings for provider clients
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.http_timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}
