//! Configuration management for the save backup.
//!
//! Loads configuration from a TOML file with environment variable overrides
//! for the Steam credentials.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::steam::DEFAULT_API_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub steam: SteamConfig,
    #[serde(default)]
    pub uplay: UplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Top-level backup directory; game saves and logs live below it
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamConfig {
    /// Steam Web API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Web API key (`STEAM_API_KEY` overrides)
    #[serde(default)]
    pub api_key: Option<String>,

    /// 64-bit Steam id of the account (`STEAM_ID` overrides)
    #[serde(default)]
    pub steam_id: Option<String>,

    /// `.../Steam/userdata/<account id>` directory holding one folder per app id
    #[serde(default)]
    pub saves_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UplayConfig {
    /// `.../Ubisoft Game Launcher/savegames/<user id>` directory
    #[serde(default)]
    pub saves_dir: Option<PathBuf>,

    /// Game id (save folder name) -> game name
    #[serde(default = "default_uplay_games")]
    pub games: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Diagnostic log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_backup_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("SavesBackup")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_uplay_games() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("5092".to_string(), "Assassin's Creed Odyssey".to_string()),
        ("5184".to_string(), "Assassin's Creed 3".to_string()),
    ])
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            backup_root: default_backup_root(),
        }
    }
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            steam_id: None,
            saves_dir: None,
        }
    }
}

impl Default for UplayConfig {
    fn default() -> Self {
        Self {
            saves_dir: None,
            games: default_uplay_games(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            paths: PathsConfig::default(),
            steam: SteamConfig::default(),
            uplay: UplayConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl PathsConfig {
    /// Directory receiving one subdirectory per game
    pub fn game_dir(&self) -> PathBuf {
        self.backup_root.join("GameSaves")
    }

    /// Directory receiving the dated run logs
    pub fn log_dir(&self) -> PathBuf {
        self.backup_root.join("Logs")
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `STEAM_API_KEY` / `STEAM_ID` from the environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("STEAM_API_KEY").filter(|v| !v.is_empty()) {
            self.steam.api_key = Some(key);
        }
        if let Some(id) = lookup("STEAM_ID").filter(|v| !v.is_empty()) {
            self.steam.steam_id = Some(id);
        }
        self
    }
}
