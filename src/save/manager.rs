//! One JSON file per named save under the saves directory.

use super::error::{Result, SaveError};
use super::stats::PlayerStats;
use crate::achievements::AchievementManager;
use crate::catalog::Catalog;
use crate::core::constants::{
    AUTO_SAVE_NAME_FORMAT, SAVES_DIR_NAME, SAVE_EXTENSION, SAVE_FORMAT_VERSION,
};
use crate::run::GameState;
use crate::utils::persistence::data_dir;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk save layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub game_state: GameState,
    #[serde(default)]
    pub player_data: PlayerStats,
    #[serde(default)]
    pub achievements: AchievementManager,
    /// Epoch seconds when the save was written.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub version: u32,
}

/// Everything restored by [`SaveManager::load_game`].
#[derive(Debug, Clone)]
pub struct LoadedGame {
    pub game_state: GameState,
    pub player_stats: PlayerStats,
    pub achievements: AchievementManager,
    pub timestamp: i64,
}

/// Listing entry for a save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub name: String,
    pub character_name: String,
    pub class_id: String,
    pub level: u32,
    pub current_floor: u32,
    pub score: i64,
    pub is_completed: bool,
    pub timestamp: i64,
}

pub struct SaveManager {
    saves_dir: PathBuf,
}

impl SaveManager {
    /// Uses `saves_dir`, creating it if needed.
    pub fn new(saves_dir: impl AsRef<Path>) -> Result<Self> {
        let saves_dir = saves_dir.as_ref().to_path_buf();
        fs::create_dir_all(&saves_dir)?;
        Ok(Self { saves_dir })
    }

    /// `~/.physrogue/saves`.
    pub fn default_location() -> Result<Self> {
        Self::new(data_dir()?.join(SAVES_DIR_NAME))
    }

    pub fn saves_dir(&self) -> &Path {
        &self.saves_dir
    }

    fn save_path(&self, name: &str) -> PathBuf {
        self.saves_dir
            .join(format!("{}.{}", sanitize_name(name), SAVE_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.save_path(name).exists()
    }

    /// Writes a snapshot under `name`, or under a timestamped name when none
    /// is given. Returns the name the save can be loaded by.
    pub fn save_game(
        &self,
        state: &GameState,
        stats: &PlayerStats,
        achievements: &AchievementManager,
        name: Option<&str>,
    ) -> Result<String> {
        let now = Utc::now();
        let name = match name {
            Some(name) => sanitize_name(name),
            None => now.format(AUTO_SAVE_NAME_FORMAT).to_string(),
        };
        if name.is_empty() {
            return Err(SaveError::InvalidName(name));
        }

        let record = SaveRecord {
            game_state: state.clone(),
            player_data: stats.clone(),
            achievements: achievements.clone(),
            timestamp: now.timestamp(),
            version: SAVE_FORMAT_VERSION,
        };
        let json = serde_json::to_string_pretty(&record)?;

        let path = self.save_path(&name);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved {} to {}", name, path.display());
        Ok(name)
    }

    fn read_record(&self, name: &str) -> Result<SaveRecord> {
        let path = self.save_path(name);
        if !path.exists() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        read_record_at(&path)
    }

    /// Restores a save. Fails if the character's class is no longer in the
    /// catalog; otherwise catalog records are re-shared with the character.
    pub fn load_game(&self, name: &str, catalog: &Catalog) -> Result<LoadedGame> {
        let record = self.read_record(name)?;
        let mut game_state = record.game_state;

        let class_id = &game_state.character().class_id;
        if catalog.class(class_id).is_none() {
            return Err(SaveError::UnknownClass(class_id.clone()));
        }
        game_state.relink(catalog);

        tracing::debug!("Loaded {}", name);
        Ok(LoadedGame {
            game_state,
            player_stats: record.player_data,
            achievements: record.achievements,
            timestamp: record.timestamp,
        })
    }

    /// Every readable save, newest first. Unparsable files are skipped.
    pub fn list_saves(&self) -> Result<Vec<SaveInfo>> {
        let mut saves = Vec::new();

        for entry in fs::read_dir(&self.saves_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some(SAVE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match read_record_at(&path) {
                Ok(record) => {
                    let state = &record.game_state;
                    let character = state.character();
                    saves.push(SaveInfo {
                        name: name.to_string(),
                        character_name: character.name.clone(),
                        class_id: character.class_id.clone(),
                        level: character.level(),
                        current_floor: state.current_floor(),
                        score: state.score(),
                        is_completed: state.is_completed(),
                        timestamp: record.timestamp,
                    });
                }
                Err(e) => tracing::warn!("Skipping unreadable save {}: {}", path.display(), e),
            }
        }

        saves.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.name.cmp(&b.name)));
        Ok(saves)
    }

    pub fn delete_save(&self, name: &str) -> Result<()> {
        let path = self.save_path(name);
        if !path.exists() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        tracing::debug!("Deleted save {}", name);
        Ok(())
    }
}

fn read_record_at(path: &Path) -> Result<SaveRecord> {
    let json = fs::read_to_string(path)?;
    let record: SaveRecord = serde_json::from_str(&json)?;
    if record.version > SAVE_FORMAT_VERSION {
        return Err(SaveError::UnsupportedVersion(record.version));
    }
    Ok(record)
}

/// Lowercases, swaps spaces for underscores, and drops anything that is not
/// alphanumeric, `_` or `-`.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
