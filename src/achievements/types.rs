//! Achievement ids, unlock records and the run-end rule set.

use crate::core::balance::{ELITE_SLAYER_COUNT, HOT_STREAK_LENGTH, MASTER_PHYSICIST_LEVEL};
use crate::run::GameState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for each achievement. Serialized ids match the
/// `achievements` catalog collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    /// Finish any run
    FirstRun,
    /// End a run at full lives
    PerfectFloor,
    /// Reach level 10
    MasterPhysicist,
    /// Win without losing a life
    Ironman,
    /// Defeat 3 elites in one run
    EliteSlayer,
    /// 10 correct answers in a row
    HotStreak,
}

impl AchievementId {
    pub const ALL: [AchievementId; 6] = [
        AchievementId::FirstRun,
        AchievementId::PerfectFloor,
        AchievementId::MasterPhysicist,
        AchievementId::Ironman,
        AchievementId::EliteSlayer,
        AchievementId::HotStreak,
    ];

    /// Catalog id of the display record.
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstRun => "first_run",
            AchievementId::PerfectFloor => "perfect_floor",
            AchievementId::MasterPhysicist => "master_physicist",
            AchievementId::Ironman => "ironman",
            AchievementId::EliteSlayer => "elite_slayer",
            AchievementId::HotStreak => "hot_streak",
        }
    }

    /// Whether the finished run satisfies this achievement's rule.
    fn is_earned_by(&self, state: &GameState) -> bool {
        let character = state.character();
        match self {
            AchievementId::FirstRun => state.is_completed(),
            AchievementId::PerfectFloor => {
                character.is_at_full_lives() && state.current_floor() > 0
            }
            AchievementId::MasterPhysicist => character.level() >= MASTER_PHYSICIST_LEVEL,
            AchievementId::Ironman => state.is_successful() && state.lives_lost() == 0,
            AchievementId::EliteSlayer => {
                state.path_history().elites_defeated() >= ELITE_SLAYER_COUNT
            }
            AchievementId::HotStreak => state.best_streak() >= HOT_STREAK_LENGTH,
        }
    }
}

/// Record of an unlocked achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub unlocked_at: i64,
    pub character_name: Option<String>,
}

/// Unlocked achievements across every run (saved to disk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementManager {
    #[serde(default)]
    pub unlocked: BTreeMap<AchievementId, UnlockedAchievement>,
}

impl AchievementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains_key(&id)
    }

    /// Unlock an achievement. Returns true if newly unlocked.
    pub fn unlock(&mut self, id: AchievementId, character_name: Option<String>) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked.insert(
            id,
            UnlockedAchievement {
                unlocked_at: chrono::Utc::now().timestamp(),
                character_name,
            },
        );
        true
    }

    pub fn unlocked_ids(&self) -> impl Iterator<Item = AchievementId> + '_ {
        self.unlocked.keys().copied()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Get unlock percentage (0.0 - 100.0).
    pub fn unlock_percentage(&self) -> f32 {
        (self.unlocked_count() as f32 / AchievementId::ALL.len() as f32) * 100.0
    }

    /// Evaluates every rule against a finished run and returns the ids
    /// unlocked by this call.
    pub fn check_run_achievements(&mut self, state: &GameState) -> Vec<AchievementId> {
        let name = &state.character().name;
        let mut newly_unlocked = Vec::new();
        for id in AchievementId::ALL {
            if id.is_earned_by(state) && self.unlock(id, Some(name.clone())) {
                tracing::info!("Achievement unlocked: {}", id.as_str());
                newly_unlocked.push(id);
            }
        }
        newly_unlocked
    }
}
