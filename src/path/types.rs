//! Branching path data structures: nodes, floors and the connection graph.

use crate::catalog::Rarity;
use crate::questions::Question;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of node on a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Single question (50% base weight)
    Question,
    /// Study material, grants insight (15%)
    Reference,
    /// Restores a life (15%)
    Rest,
    /// Random consumable (10%)
    Treasure,
    /// Two questions guarding a relic (5%)
    Elite,
    /// Event or shop from the catalog (5%)
    Encounter,
    /// Final floor only
    Boss,
}

impl NodeType {
    /// Types that can be rolled on interior floors, in weight-table order.
    pub const INTERIOR: [NodeType; 6] = [
        NodeType::Question,
        NodeType::Reference,
        NodeType::Rest,
        NodeType::Treasure,
        NodeType::Elite,
        NodeType::Encounter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Question => "Question",
            NodeType::Reference => "Reference",
            NodeType::Rest => "Rest",
            NodeType::Treasure => "Treasure",
            NodeType::Elite => "Elite",
            NodeType::Encounter => "Encounter",
            NodeType::Boss => "Boss",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NodeType::Question => "❓",
            NodeType::Reference => "📚",
            NodeType::Rest => "☕",
            NodeType::Treasure => "🎁",
            NodeType::Elite => "⚔️",
            NodeType::Encounter => "🎲",
            NodeType::Boss => "👑",
        }
    }
}

/// Content generated the first time a node is visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeContent {
    Question { question: Question },
    Reference { insight: i32 },
    Rest { lives: i32 },
    Treasure { rarity: Rarity },
    Elite { questions: Vec<Question>, reward_rarity: Rarity },
    Boss { questions: Vec<Question> },
    Encounter { encounter_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    pub icon: String,
    pub difficulty: u8,
    pub category: String,
    /// Generator floor index (0 = entry).
    pub floor: usize,
    pub position: usize,
    visited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<NodeContent>,
}

impl Node {
    pub fn new(
        node_type: NodeType,
        floor: usize,
        position: usize,
        difficulty: u8,
        category: String,
    ) -> Self {
        Self {
            id: format!("f{}_n{}", floor, position),
            node_type,
            name: node_type.name().to_string(),
            icon: node_type.icon().to_string(),
            difficulty,
            category,
            floor,
            position,
            visited: false,
            content: None,
        }
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn content(&self) -> Option<&NodeContent> {
        self.content.as_ref()
    }

    /// Marks the node visited. Returns false if it already was.
    pub(crate) fn mark_visited(&mut self) -> bool {
        if self.visited {
            return false;
        }
        self.visited = true;
        true
    }

    /// Stores generated content unless some already exists.
    pub(crate) fn set_content_once(&mut self, content: NodeContent) {
        if self.content.is_none() {
            self.content = Some(content);
        }
    }
}

/// One layer of the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub index: usize,
    pub nodes: Vec<Node>,
}

impl Floor {
    pub fn width(&self) -> usize {
        self.nodes.len()
    }
}

/// Node id to the ids it leads to on the next floor.
pub type Connections = BTreeMap<String, BTreeSet<String>>;

/// Output of path generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPath {
    pub floors: Vec<Floor>,
    pub connections: Connections,
}

impl GeneratedPath {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.floors
            .iter()
            .flat_map(|f| f.nodes.iter())
            .find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.floors.iter().map(Floor::width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_visits_once() {
        let mut node = Node::new(NodeType::Rest, 2, 1, 1, "imaging".to_string());
        assert_eq!(node.id, "f2_n1");
        assert!(!node.is_visited());
        assert!(node.mark_visited());
        assert!(!node.mark_visited());
        assert!(node.is_visited());
    }

    #[test]
    fn test_content_memoized() {
        let mut node = Node::new(NodeType::Reference, 1, 0, 1, "imaging".to_string());
        node.set_content_once(NodeContent::Reference { insight: 20 });
        node.set_content_once(NodeContent::Reference { insight: 99 });
        assert_eq!(node.content(), Some(&NodeContent::Reference { insight: 20 }));
    }

    #[test]
    fn test_node_json_uses_type_key() {
        let node = Node::new(NodeType::Elite, 3, 0, 2, "dosimetry".to_string());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "elite");
        assert!(json.get("content").is_none());
    }
}
