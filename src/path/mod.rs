//! The run map: node types, floor generation and the visit log.

pub mod generation;
pub mod history;
pub mod types;

pub use generation::{difficulty_for, BranchingPathGenerator};
pub use history::{PathHistory, PlayStyle, RunStatistics, VisitRecord};
pub use types::{Connections, Floor, GeneratedPath, Node, NodeContent, NodeType};
