// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game configuration stored as TOML in the platform config directory

use crate::{GameError, MAX_GAME_TIME, MAX_TEAM_COUNT, MIN_GAME_TIME, MIN_TEAM_COUNT};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings a new game state starts from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of teams players are split across
    #[serde(default = "default_target_team_count")]
    pub target_team_count: u8,
    /// Length of a game in seconds
    #[serde(default = "default_game_time_secs")]
    pub game_time_secs: u32,
    /// Ammo a player joins and respawns with
    #[serde(default = "default_starting_ammo")]
    pub starting_ammo: u32,
    /// Full health of a player
    #[serde(default = "default_max_health")]
    pub max_health: u32,
}

fn default_target_team_count() -> u8 {
    2
}

fn default_game_time_secs() -> u32 {
    10 * 60
}

fn default_starting_ammo() -> u32 {
    100
}

fn default_max_health() -> u32 {
    100
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_team_count: default_target_team_count(),
            game_time_secs: default_game_time_secs(),
            starting_ammo: default_starting_ammo(),
            max_health: default_max_health(),
        }
    }
}

impl GameConfig {
    /// Check the values against the supported ranges
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_TEAM_COUNT..=MAX_TEAM_COUNT).contains(&self.target_team_count) {
            return Err(GameError::InvalidTeamCount(self.target_team_count));
        }
        if !(MIN_GAME_TIME..=MAX_GAME_TIME).contains(&self.game_time_secs) {
            return Err(GameError::InvalidGameTime(self.game_time_secs));
        }
        Ok(())
    }
}

/// Location of the config file for this platform
pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "braidstag", "braidstag")
        .context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config from the platform location, writing defaults on first run
pub fn load_config() -> Result<GameConfig> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    load_config_from(&config_path)
}

/// Load the config from `path`, writing defaults there if it does not exist
pub fn load_config_from(path: &Path) -> Result<GameConfig> {
    if !path.exists() {
        tracing::info!("Config file not found, creating default at: {}", path.display());
        let default_config = GameConfig::default();
        save_config_to(&default_config, path)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = toml::from_str::<GameConfig>(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}

/// Write the config to `path`, creating parent directories as needed
pub fn save_config_to(config: &GameConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let toml_content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::info!("Saved config to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.target_team_count, 2);
        assert_eq!(config.game_time_secs, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = load_config_from(&path)?;
        assert_eq!(config, GameConfig::default());
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "target_team_count = 4\n")?;

        let config = load_config_from(&path)?;
        assert_eq!(config.target_team_count, 4);
        assert_eq!(config.max_health, 100);
        Ok(())
    }

    #[test]
    fn test_out_of_range_file_rejected() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "game_time_secs = 5\n")?;

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        Ok(())
    }
}
