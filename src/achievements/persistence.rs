//! Achievement persistence (load/save to disk).

use super::types::AchievementManager;
use crate::core::constants::ACHIEVEMENTS_FILE;
use crate::utils::persistence::{load_json_or_default, save_json};
use std::io;
use std::path::{Path, PathBuf};

/// `achievements.json` inside `dir`.
pub fn achievements_path(dir: &Path) -> PathBuf {
    dir.join(ACHIEVEMENTS_FILE)
}

/// Load achievements from `dir`, or return default if missing or corrupt.
pub fn load_achievements(dir: &Path) -> AchievementManager {
    load_json_or_default(&achievements_path(dir))
}

pub fn save_achievements(dir: &Path, achievements: &AchievementManager) -> io::Result<()> {
    save_json(&achievements_path(dir), achievements)
}
