//! Achievement system module.
//!
//! Tracks unlocks across every run. Achievements are stored in
//! `~/.physrogue/achievements.json`; display names and icons come from the
//! catalog's `achievements` collection.

pub mod persistence;
pub mod types;

pub use persistence::{load_achievements, save_achievements};
pub use types::{AchievementId, AchievementManager, UnlockedAchievement};
