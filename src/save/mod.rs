//! Named save files holding a run snapshot and the player's progress.

pub mod error;
pub mod manager;
pub mod stats;

pub use error::SaveError;
pub use manager::{sanitize_name, LoadedGame, SaveInfo, SaveManager, SaveRecord};
pub use stats::PlayerStats;
