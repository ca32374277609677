//! Run configuration and persisted player settings.

use super::balance::{DEFAULT_MAX_FLOORS, DEFAULT_MAX_FLOOR_WIDTH, DEFAULT_MIN_FLOOR_WIDTH};
use super::constants::{DEFAULT_QUESTION_TIMER_SECONDS, SETTINGS_FILE};
use crate::utils::persistence::{load_json_or_default, save_json};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Shape of a generated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total floors, entry and boss floor included.
    pub max_floors: usize,
    /// Narrowest interior floor.
    pub min_width: usize,
    /// Widest interior floor.
    pub max_width: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_floors: DEFAULT_MAX_FLOORS,
            min_width: DEFAULT_MIN_FLOOR_WIDTH,
            max_width: DEFAULT_MAX_FLOOR_WIDTH,
        }
    }
}

impl RunConfig {
    pub fn new(max_floors: usize, min_width: usize, max_width: usize) -> Self {
        Self {
            max_floors,
            min_width,
            max_width,
        }
        .normalized()
    }

    /// Clamps out-of-range values: at least an entry and a boss floor,
    /// and `1 <= min_width <= max_width`.
    pub fn normalized(self) -> Self {
        let min_width = self.min_width.max(1);
        Self {
            max_floors: self.max_floors.max(2),
            min_width,
            max_width: self.max_width.max(min_width),
        }
    }
}

/// Player-facing preferences stored in `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display a countdown next to questions. Has no effect on scoring.
    pub show_question_timer: bool,
    pub question_timer_seconds: u32,
    /// Class preselected when starting a new run.
    pub preferred_class: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_question_timer: false,
            question_timer_seconds: DEFAULT_QUESTION_TIMER_SECONDS,
            preferred_class: None,
        }
    }
}

impl Settings {
    /// Loads settings from `dir`, falling back to defaults if missing or invalid.
    pub fn load(dir: &Path) -> Self {
        load_json_or_default(&dir.join(SETTINGS_FILE))
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        save_json(&dir.join(SETTINGS_FILE), self)
    }
}
