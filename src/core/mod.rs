//! Balance numbers, configuration and shared error types.

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;

pub use config::{RunConfig, Settings};
pub use error::{GameError, Result};
