//! Error types surfaced by run and session operations.

use thiserror::Error;

/// Failures reported by [`GameSession`](crate::run::GameSession) operations.
///
/// None of these are fatal: the session state is unchanged whenever one is
/// returned, so the caller can report it and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no run is in progress")]
    NoActiveRun,

    #[error("the run is already over")]
    RunAlreadyOver,

    #[error("unknown character class: {0}")]
    UnknownClass(String),

    #[error("unknown challenge mode: {0}")]
    UnknownChallengeMode(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already visited: {0}")]
    NodeAlreadyVisited(String),

    #[error("node {0} is not reachable from the current position")]
    NodeUnavailable(String),

    #[error("no question is waiting for an answer")]
    NoActiveQuestion,

    #[error("answer index {index} out of range for {options} options")]
    InvalidAnswer { index: usize, options: usize },

    #[error("perk {0} was not offered")]
    UnknownPerk(String),

    #[error("finish the current node first ({0})")]
    InteractionPending(&'static str),

    #[error("no shop is open")]
    NoShopOpen,

    #[error("nothing for sale at slot {0}")]
    InvalidShopSlot(usize),

    #[error("not enough insight: need {needed}, have {available}")]
    InsufficientInsight { needed: i32, available: i32 },

    #[error("no inventory item at slot {0}")]
    InvalidItemSlot(usize),
}

pub type Result<T> = std::result::Result<T, GameError>;
