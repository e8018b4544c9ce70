//! Application configuration management.
//!
//! The configuration holds the active season, the last finished gameweek seen
//! by a refresh, and the nickname mappings for the managers and leagues being
//! followed. It is loaded once at startup and passed by reference to the sync
//! engine and read models.
//!
//! Configuration is stored at `~/.config/fplstats/config.json` unless an
//! explicit path is given.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{GameweekId, LeagueId, ManagerId};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "fplstats";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// First month of a new Premier League season
const SEASON_START_MONTH: u32 = 7;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Name {0} is already in use")]
    DuplicateName(String),

    #[error("ID {id} is already registered as {name}")]
    DuplicateId { id: u64, name: String },

    #[error("No entry named {0}")]
    UnknownName(String),

    #[error("Invalid season {0}: expected a four-digit year")]
    InvalidSeason(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Season identifier: the calendar year in which the season ends
    pub season: String,
    #[serde(default)]
    pub last_finished_gameweek: GameweekId,
    /// Nickname -> manager id
    #[serde(default)]
    pub managers: BTreeMap<String, ManagerId>,
    /// Nickname -> league id
    #[serde(default)]
    pub leagues: BTreeMap<String, LeagueId>,
    /// Overrides the public API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Overrides the platform cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_root: Option<PathBuf>,

    /// File this configuration was loaded from
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season: current_season(),
            last_finished_gameweek: 0,
            managers: BTreeMap::new(),
            leagues: BTreeMap::new(),
            base_url: None,
            cache_root: None,
            path: None,
        }
    }
}

/// Season running today. A season that starts in August 2023 is "2024".
fn current_season() -> String {
    let today = Utc::now().date_naive();
    let year = if today.month() >= SEASON_START_MONTH {
        today.year() + 1
    } else {
        today.year()
    };
    year.to_string()
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    /// Later `save` calls write back to the same file.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.path = Some(path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => Self::config_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Root holding one directory per season
    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.cache_root {
            return Ok(root.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Cache directory of the active season
    pub fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_root()?.join(&self.season))
    }

    pub fn set_season(&mut self, season: &str) -> Result<(), ConfigError> {
        let valid = season.len() == 4 && season.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(ConfigError::InvalidSeason(season.to_string()));
        }
        if self.season != season {
            self.season = season.to_string();
            self.last_finished_gameweek = 0;
        }
        Ok(())
    }

    // ===== Managers =====

    pub fn add_manager(&mut self, nickname: &str, id: ManagerId) -> Result<(), ConfigError> {
        add_mapping(&mut self.managers, nickname, id)
    }

    pub fn remove_manager(&mut self, nickname: &str) -> Result<ManagerId, ConfigError> {
        self.managers
            .remove(nickname)
            .ok_or_else(|| ConfigError::UnknownName(nickname.to_string()))
    }

    pub fn manager_nickname(&self, id: ManagerId) -> Option<&str> {
        nickname_of(&self.managers, id)
    }

    /// Resolve a nickname or a numeric id to a manager id.
    pub fn resolve_manager(&self, name_or_id: &str) -> Option<ManagerId> {
        resolve(&self.managers, name_or_id)
    }

    // ===== Leagues =====

    pub fn add_league(&mut self, nickname: &str, id: LeagueId) -> Result<(), ConfigError> {
        add_mapping(&mut self.leagues, nickname, id)
    }

    pub fn remove_league(&mut self, nickname: &str) -> Result<LeagueId, ConfigError> {
        self.leagues
            .remove(nickname)
            .ok_or_else(|| ConfigError::UnknownName(nickname.to_string()))
    }

    pub fn league_nickname(&self, id: LeagueId) -> Option<&str> {
        nickname_of(&self.leagues, id)
    }

    pub fn resolve_league(&self, name_or_id: &str) -> Option<LeagueId> {
        resolve(&self.leagues, name_or_id)
    }
}

fn add_mapping(map: &mut BTreeMap<String, u64>, nickname: &str, id: u64) -> Result<(), ConfigError> {
    if map.contains_key(nickname) {
        return Err(ConfigError::DuplicateName(nickname.to_string()));
    }
    if let Some(existing) = nickname_of(map, id) {
        return Err(ConfigError::DuplicateId {
            id,
            name: existing.to_string(),
        });
    }
    map.insert(nickname.to_string(), id);
    Ok(())
}

fn nickname_of(map: &BTreeMap<String, u64>, id: u64) -> Option<&str> {
    map.iter().find(|(_, &v)| v == id).map(|(k, _)| k.as_str())
}

fn resolve(map: &BTreeMap<String, u64>, name_or_id: &str) -> Option<u64> {
    map.get(name_or_id)
        .copied()
        .or_else(|| name_or_id.parse().ok())
}
