//! Results returned to the caller by run operations.

use crate::achievements::AchievementId;
use crate::catalog::{Consumable, Encounter, Perk, Rarity, Relic, ShopSlot};
use crate::path::RunStatistics;
use crate::questions::Question;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reward granted once every question of an elite or boss node is answered
/// and the character is still standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    Relic { rarity: Rarity },
    CompleteRotation { floor: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RewardGranted {
    /// `None` when every relic in the catalog is already owned.
    Relic(Option<Arc<Relic>>),
    Rotation { floor: u32, insight: i32 },
}

/// What happened when a one-shot effect was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectResult {
    pub description: String,
    pub levels_gained: u32,
    pub perk_choices: Vec<Arc<Perk>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncounterOutcome {
    Event {
        encounter: Arc<Encounter>,
        result: EffectResult,
    },
    Shop {
        encounter: Arc<Encounter>,
        stock: Vec<ShopSlot>,
    },
    /// The catalog had no encounter to offer.
    Quiet,
}

/// Result of resolving a node's effects, one variant per node type.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    Question {
        question: Question,
    },
    Reference {
        insight_gained: i32,
    },
    Rest {
        lives_restored: i32,
    },
    Treasure {
        rarity: Rarity,
        item: Option<Arc<Consumable>>,
    },
    Elite {
        questions: Vec<Question>,
        reward: Reward,
    },
    Boss {
        questions: Vec<Question>,
        reward: Reward,
    },
    Encounter(EncounterOutcome),
}

impl NodeOutcome {
    /// Questions the caller must resolve before moving on.
    pub fn questions(&self) -> &[Question] {
        match self {
            NodeOutcome::Question { question } => std::slice::from_ref(question),
            NodeOutcome::Elite { questions, .. } | NodeOutcome::Boss { questions, .. } => {
                questions
            }
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: String,
    pub score_gained: i64,
    pub experience_gained: u32,
    pub streak: u32,
    pub levels_gained: u32,
    pub level_up: bool,
    pub perk_choices: Vec<Arc<Perk>>,
    pub lives_remaining: i32,
    pub run_over: bool,
    /// Set when this answer finished an elite or boss node.
    pub reward: Option<RewardGranted>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorCompletion {
    pub floor: u32,
    pub lives_recovered: i32,
}

/// Final tally computed by `end_run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub final_score: i64,
    pub floor_reached: u32,
    pub lives_remaining: i32,
    pub level: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub best_streak: u32,
    pub duration_seconds: i64,
    pub statistics: RunStatistics,
}

impl RunSummary {
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.questions_answered as f64
        }
    }
}

/// Run summary plus the achievements it unlocked.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEnd {
    pub summary: RunSummary,
    pub new_achievements: Vec<AchievementId>,
}

/// Result of `continue_after_node`.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorProgress {
    NextFloor {
        floor: u32,
        completion: FloorCompletion,
    },
    RunEnded(RunEnd),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Purchase {
    Consumable(Arc<Consumable>),
    Relic(Arc<Relic>),
}
