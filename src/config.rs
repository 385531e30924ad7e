//! Saved HQ server profiles

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Connection details worth remembering between runs. Passwords and tokens
/// are never written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerProfile {
    pub base_url: String,
    pub workspace: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub servers: Vec<ServerProfile>,
    pub current: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push("hqbridge");
        path.push("config.toml");
        Ok(path)
    }

    /// Remember the last successfully used connection and make it current.
    pub fn remember(&mut self, base_url: &str, workspace: Option<&str>, username: Option<&str>) {
        let profile = ServerProfile {
            base_url: base_url.to_string(),
            workspace: workspace.map(String::from),
            username: username.map(String::from),
        };
        match self.servers.iter_mut().find(|s| s.base_url == base_url) {
            Some(existing) => *existing = profile,
            None => self.servers.push(profile),
        }
        self.current = Some(base_url.to_string());
    }

    pub fn current_profile(&self) -> Option<&ServerProfile> {
        let current = self.current.as_deref()?;
        self.servers.iter().find(|s| s.base_url == current)
    }
}
