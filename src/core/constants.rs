// Data directory layout
pub const DATA_DIR_NAME: &str = ".physrogue";
pub const SAVES_DIR_NAME: &str = "saves";
pub const CATALOG_DIR_NAME: &str = "catalog";
pub const SETTINGS_FILE: &str = "settings.json";
pub const ACHIEVEMENTS_FILE: &str = "achievements.json";

// Save format
pub const SAVE_FORMAT_VERSION: u32 = 1;
pub const SAVE_EXTENSION: &str = "json";
pub const AUTO_SAVE_NAME_FORMAT: &str = "save_%Y%m%d_%H%M%S";

// Question timer (display only)
pub const DEFAULT_QUESTION_TIMER_SECONDS: u32 = 60;
