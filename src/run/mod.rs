//! A single run: state machine, node effects, answers, and the session
//! boundary front ends talk to.

pub mod answers;
pub mod effects;
pub mod outcomes;
pub mod session;
pub mod state;

pub use answers::{experience_for_difficulty, score_for_streak};
pub use outcomes::{
    AnswerOutcome, EffectResult, EncounterOutcome, FloorCompletion, FloorProgress, NodeOutcome,
    Purchase, Reward, RewardGranted, RunEnd, RunSummary,
};
pub use session::GameSession;
pub use state::{GameState, OpenShop, PendingInteraction, RunPhase};
