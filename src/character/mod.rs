//! Character progression state.

pub mod model;

pub use model::Character;
