//! physrogue - a roguelike quiz run through a medical physics residency.
//!
//! The crate is the game engine only: content catalogs, question banks,
//! branching floor generation, run state and persistence. Front ends drive
//! a run through [`run::GameSession`].

pub mod achievements;
pub mod catalog;
pub mod character;
pub mod core;
pub mod path;
pub mod questions;
pub mod run;
pub mod save;
pub mod utils;

pub use catalog::Catalog;
pub use core::{GameError, RunConfig, Settings};
pub use questions::QuestionBank;
pub use run::{GameSession, GameState};
pub use save::SaveManager;
