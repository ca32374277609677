//! Append-only record of a run's node visits and floor completions.

use super::types::{Node, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub node_id: String,
    pub node_type: NodeType,
    /// Run floor (1-based) at the time of the visit.
    pub floor: u32,
    pub timestamp: i64,
}

/// How the player tends to route through the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayStyle {
    /// Mostly questions and references
    Scholar,
    /// Seeks out elites
    Daredevil,
    /// Leans on rest stops
    Cautious,
    /// Chases treasure and encounters
    Explorer,
    Balanced,
}

impl PlayStyle {
    pub fn name(&self) -> &'static str {
        match self {
            PlayStyle::Scholar => "Scholar",
            PlayStyle::Daredevil => "Daredevil",
            PlayStyle::Cautious => "Cautious",
            PlayStyle::Explorer => "Explorer",
            PlayStyle::Balanced => "Balanced",
        }
    }
}

/// Summary derived from a [`PathHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total_visits: u32,
    pub visits_by_type: BTreeMap<NodeType, u32>,
    pub floors_completed: u32,
    pub elites_defeated: u32,
    pub highest_floor: u32,
    pub play_style: PlayStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathHistory {
    visits: Vec<VisitRecord>,
    type_counts: BTreeMap<NodeType, u32>,
    floors_completed: u32,
    elites_defeated: u32,
    highest_floor: u32,
}

impl PathHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_visit(&mut self, node: &Node, floor: u32, timestamp: i64) {
        self.visits.push(VisitRecord {
            node_id: node.id.clone(),
            node_type: node.node_type,
            floor,
            timestamp,
        });
        *self.type_counts.entry(node.node_type).or_insert(0) += 1;
        self.highest_floor = self.highest_floor.max(floor);
    }

    pub(crate) fn record_floor_completion(&mut self, floor: u32) {
        self.floors_completed += 1;
        self.highest_floor = self.highest_floor.max(floor);
    }

    pub(crate) fn record_elite_defeated(&mut self) {
        self.elites_defeated += 1;
    }

    pub fn visits(&self) -> &[VisitRecord] {
        &self.visits
    }

    pub fn count(&self, node_type: NodeType) -> u32 {
        self.type_counts.get(&node_type).copied().unwrap_or(0)
    }

    pub fn floors_completed(&self) -> u32 {
        self.floors_completed
    }

    pub fn elites_defeated(&self) -> u32 {
        self.elites_defeated
    }

    pub fn highest_floor(&self) -> u32 {
        self.highest_floor
    }

    /// Classifies the route by the share of each node type visited.
    /// The boss is excluded since every winning run visits it.
    pub fn play_style(&self) -> PlayStyle {
        let total = self.visits.len() as u32 - self.count(NodeType::Boss);
        if total == 0 {
            return PlayStyle::Balanced;
        }
        let share = |types: &[NodeType]| {
            types.iter().map(|&t| self.count(t)).sum::<u32>() as f64 / total as f64
        };

        if share(&[NodeType::Elite]) >= 0.25 {
            PlayStyle::Daredevil
        } else if share(&[NodeType::Rest]) >= 0.3 {
            PlayStyle::Cautious
        } else if share(&[NodeType::Treasure, NodeType::Encounter]) >= 0.35 {
            PlayStyle::Explorer
        } else if share(&[NodeType::Question, NodeType::Reference]) >= 0.7 {
            PlayStyle::Scholar
        } else {
            PlayStyle::Balanced
        }
    }

    pub fn statistics(&self) -> RunStatistics {
        RunStatistics {
            total_visits: self.visits.len() as u32,
            visits_by_type: self.type_counts.clone(),
            floors_completed: self.floors_completed,
            elites_defeated: self.elites_defeated,
            highest_floor: self.highest_floor,
            play_style: self.play_style(),
        }
    }
}
