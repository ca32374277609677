//! Shared balance constants used by both the game and the simulator.
//!
//! All gameplay numbers live here. Change once, test everywhere.

// =============================================================================
// PATH GENERATION
// =============================================================================

/// Default number of floors in a run (entry floor and boss floor included).
pub const DEFAULT_MAX_FLOORS: usize = 10;

/// Default narrowest interior floor.
pub const DEFAULT_MIN_FLOOR_WIDTH: usize = 2;

/// Default widest interior floor.
pub const DEFAULT_MAX_FLOOR_WIDTH: usize = 4;

/// Base node type weights for interior floors:
/// question, reference, rest, treasure, elite, encounter.
pub const BASE_NODE_WEIGHTS: [f64; 6] = [50.0, 15.0, 15.0, 10.0, 5.0, 5.0];

/// Weight moved from question to elite on the final interior floor.
/// Scales linearly with run progress.
pub const LATE_FLOOR_ELITE_SHIFT: f64 = 20.0;

/// Rest weight multiplier for the first node of a floor.
pub const FIRST_POSITION_REST_FACTOR: f64 = 2.0;

/// Extra elite and treasure weight for the last node of a floor.
pub const LAST_POSITION_BONUS: f64 = 5.0;

/// Maximum outgoing edges per node when neither floor is a single node.
pub const MAX_OUTGOING_EDGES: usize = 3;

/// Floors per difficulty step (`difficulty = floor / 3 + 1`).
pub const FLOORS_PER_DIFFICULTY: usize = 3;

/// Highest question difficulty.
pub const MAX_DIFFICULTY: u8 = 3;

/// Question categories drawn uniformly for node content.
pub const CATEGORIES: [&str; 6] = [
    "radiation_physics",
    "dosimetry",
    "radiobiology",
    "imaging",
    "radiation_protection",
    "treatment_planning",
];

// =============================================================================
// CHARACTER
// =============================================================================

/// Experience needed for the first level-up.
pub const BASE_EXPERIENCE_TO_LEVEL: u32 = 100;

/// Threshold growth applied after each level-up (+20%).
pub const LEVEL_THRESHOLD_GROWTH: f64 = 1.2;

// =============================================================================
// QUESTIONS & SCORING
// =============================================================================

/// Score for a correct answer before the streak bonus.
pub const BASE_QUESTION_SCORE: f64 = 10.0;

/// Streak bonus per consecutive correct answer.
pub const STREAK_BONUS_PER_ANSWER: f64 = 0.1;

/// Streak bonus cap (+50%).
pub const STREAK_BONUS_CAP: f64 = 0.5;

/// Experience per difficulty point of a correctly answered question.
pub const EXPERIENCE_PER_DIFFICULTY: u32 = 20;

/// Damage taken for a wrong answer.
pub const WRONG_ANSWER_DAMAGE: i32 = 1;

/// Perks offered on level-up.
pub const PERK_CHOICES_ON_LEVEL_UP: usize = 3;

/// Questions asked by an elite node.
pub const ELITE_QUESTION_COUNT: usize = 2;

/// Difficulties asked by the boss, in order.
pub const BOSS_QUESTION_DIFFICULTIES: [u8; 3] = [1, 2, 3];

// =============================================================================
// NODE REWARDS
// =============================================================================

/// Insight gained at a reference node, per difficulty point.
pub const REFERENCE_INSIGHT_PER_DIFFICULTY: i32 = 10;

/// Insight gained at a reference node before difficulty scaling.
pub const REFERENCE_BASE_INSIGHT: i32 = 10;

/// Lives restored at a rest node.
pub const REST_LIFE_RESTORE: i32 = 1;

/// Insight granted by the boss reward, per floor reached.
pub const ROTATION_INSIGHT_PER_FLOOR: i32 = 10;

// =============================================================================
// RUN END
// =============================================================================

/// Bonus added to the final score of a successful run.
pub const VICTORY_SCORE_BONUS: i64 = 500;

/// Final score bonus per floor reached.
pub const SCORE_PER_FLOOR: i64 = 50;

/// Final score bonus per remaining life.
pub const SCORE_PER_LIFE: i64 = 20;

// =============================================================================
// ACHIEVEMENTS
// =============================================================================

/// Level required for the master physicist achievement.
pub const MASTER_PHYSICIST_LEVEL: u32 = 10;

/// Elites defeated in a single run for the elite slayer achievement.
pub const ELITE_SLAYER_COUNT: u32 = 3;

/// Consecutive correct answers for the hot streak achievement.
pub const HOT_STREAK_LENGTH: u32 = 10;
