//! Branching path generation.
//!
//! A run is a stack of floors. Floor 0 is a single entry question, the last
//! floor is a single boss, and interior floors widen toward the middle of
//! the run. Every node is connected to at least one node on the next floor
//! and reached from at least one node on the previous floor.

use super::types::{Connections, Floor, GeneratedPath, Node, NodeType};
use crate::core::balance::{
    BASE_NODE_WEIGHTS, CATEGORIES, FIRST_POSITION_REST_FACTOR, FLOORS_PER_DIFFICULTY,
    LAST_POSITION_BONUS, LATE_FLOOR_ELITE_SHIFT, MAX_DIFFICULTY, MAX_OUTGOING_EDGES,
};
use crate::core::RunConfig;
use rand::seq::SliceRandom;
use rand::Rng;

// Indices into the weight table (same order as `NodeType::INTERIOR`).
const W_REST: usize = 2;
const W_TREASURE: usize = 3;
const W_ELITE: usize = 4;
const W_QUESTION: usize = 0;

/// Difficulty of a node: one step every three floors, elites one higher,
/// the boss always at the top.
pub fn difficulty_for(floor: usize, node_type: NodeType) -> u8 {
    let base = (floor / FLOORS_PER_DIFFICULTY + 1).clamp(1, MAX_DIFFICULTY as usize) as u8;
    match node_type {
        NodeType::Boss => MAX_DIFFICULTY,
        NodeType::Elite => (base + 1).min(MAX_DIFFICULTY),
        _ => base,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BranchingPathGenerator {
    config: RunConfig,
}

impl BranchingPathGenerator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn max_floors(&self) -> usize {
        self.config.max_floors
    }

    fn terminal_floor(&self) -> usize {
        self.config.max_floors - 1
    }

    /// Number of nodes on `floor`.
    pub fn floor_width(&self, floor: usize) -> usize {
        if floor == 0 || floor >= self.terminal_floor() {
            return 1;
        }
        let distance_to_edge = floor.min(self.terminal_floor() - floor);
        (distance_to_edge + 1).clamp(self.config.min_width, self.config.max_width)
    }

    /// Generates floors and connections for one run.
    pub fn generate(&self, rng: &mut impl Rng) -> GeneratedPath {
        let floors: Vec<Floor> = (0..self.config.max_floors)
            .map(|index| self.generate_floor(index, rng))
            .collect();

        let mut connections = Connections::new();
        for pair in floors.windows(2) {
            connect_floors(&pair[0].nodes, &pair[1].nodes, &mut connections, rng);
        }
        repair_connectivity(&floors, &mut connections, rng);

        tracing::debug!(
            "Generated path: {} floors, {} nodes",
            floors.len(),
            floors.iter().map(Floor::width).sum::<usize>()
        );

        GeneratedPath {
            floors,
            connections,
        }
    }

    fn generate_floor(&self, index: usize, rng: &mut impl Rng) -> Floor {
        let width = self.floor_width(index);
        let nodes = (0..width)
            .map(|position| {
                let node_type = if index == 0 {
                    NodeType::Question
                } else if index == self.terminal_floor() {
                    NodeType::Boss
                } else {
                    self.roll_node_type(index, position, width, rng)
                };
                let category = CATEGORIES
                    .choose(rng)
                    .copied()
                    .unwrap_or(CATEGORIES[0])
                    .to_string();
                Node::new(
                    node_type,
                    index,
                    position,
                    difficulty_for(index, node_type),
                    category,
                )
            })
            .collect();
        Floor { index, nodes }
    }

    /// Normalised type weights for an interior node, in `NodeType::INTERIOR` order.
    pub fn node_weights(&self, floor: usize, position: usize, width: usize) -> [f64; 6] {
        let mut weights = BASE_NODE_WEIGHTS;

        // Later floors trade questions for elites
        let last_interior = self.terminal_floor().saturating_sub(1).max(1);
        let progress = (floor as f64 / last_interior as f64).min(1.0);
        let shift = (LATE_FLOOR_ELITE_SHIFT * progress).min(weights[W_QUESTION]);
        weights[W_QUESTION] -= shift;
        weights[W_ELITE] += shift;

        if position == 0 {
            weights[W_REST] *= FIRST_POSITION_REST_FACTOR;
        }
        if width > 1 && position == width - 1 {
            weights[W_ELITE] += LAST_POSITION_BONUS;
            weights[W_TREASURE] += LAST_POSITION_BONUS;
        }

        let total: f64 = weights.iter().sum();
        weights.map(|w| w / total)
    }

    fn roll_node_type(
        &self,
        floor: usize,
        position: usize,
        width: usize,
        rng: &mut impl Rng,
    ) -> NodeType {
        let weights = self.node_weights(floor, position, width);
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (node_type, weight) in NodeType::INTERIOR.iter().zip(weights) {
            cumulative += weight;
            if roll < cumulative {
                return *node_type;
            }
        }
        NodeType::INTERIOR[NodeType::INTERIOR.len() - 1]
    }
}

impl Default for BranchingPathGenerator {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

/// Connects one floor to the next. Single-node floors connect all-to-all;
/// otherwise each source gets 1-3 edges, the first aimed at the
/// proportionally nearest index.
fn connect_floors(current: &[Node], next: &[Node], connections: &mut Connections, rng: &mut impl Rng) {
    if current.len() == 1 || next.len() == 1 {
        for source in current {
            let targets = connections.entry(source.id.clone()).or_default();
            targets.extend(next.iter().map(|n| n.id.clone()));
        }
        return;
    }

    for (i, source) in current.iter().enumerate() {
        let edge_count = rng.gen_range(1..=MAX_OUTGOING_EDGES).min(next.len());
        let nearest = ((i * next.len()) as f64 / current.len() as f64).round() as usize;
        let nearest = nearest.min(next.len() - 1);

        let mut others: Vec<usize> = (0..next.len()).filter(|&j| j != nearest).collect();
        others.shuffle(rng);

        let targets = connections.entry(source.id.clone()).or_default();
        targets.insert(next[nearest].id.clone());
        for j in others.into_iter().take(edge_count - 1) {
            targets.insert(next[j].id.clone());
        }
    }
}

/// Adds edges so every node past the entry has an incoming edge and every
/// node before the boss has an outgoing one.
fn repair_connectivity(floors: &[Floor], connections: &mut Connections, rng: &mut impl Rng) {
    for pair in floors.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        let unreached: Vec<String> = current
            .nodes
            .iter()
            .filter(|node| {
                !previous.nodes.iter().any(|p| {
                    connections
                        .get(&p.id)
                        .is_some_and(|targets| targets.contains(&node.id))
                })
            })
            .map(|node| node.id.clone())
            .collect();

        for node_id in unreached {
            if let Some(source) = previous.nodes.choose(rng) {
                tracing::debug!("Repair: linking {} -> {}", source.id, node_id);
                connections
                    .entry(source.id.clone())
                    .or_default()
                    .insert(node_id);
            }
        }

        for node in &previous.nodes {
            let has_outgoing = connections
                .get(&node.id)
                .is_some_and(|targets| !targets.is_empty());
            if !has_outgoing {
                if let Some(target) = current.nodes.choose(rng) {
                    tracing::debug!("Repair: linking {} -> {}", node.id, target.id);
                    connections
                        .entry(node.id.clone())
                        .or_default()
                        .insert(target.id.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::{HashSet, VecDeque};

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn incoming_ids(path: &GeneratedPath) -> HashSet<String> {
        path.connections.values().flatten().cloned().collect()
    }

    #[test]
    fn test_floor_widths() {
        let generator = BranchingPathGenerator::new(RunConfig::new(10, 2, 4));
        let widths: Vec<usize> = (0..10).map(|f| generator.floor_width(f)).collect();
        assert_eq!(widths, vec![1, 2, 3, 4, 4, 4, 4, 3, 2, 1]);
    }

    #[test]
    fn test_floor_widths_short_run() {
        let generator = BranchingPathGenerator::new(RunConfig::new(5, 2, 4));
        let widths: Vec<usize> = (0..5).map(|f| generator.floor_width(f)).collect();
        assert_eq!(widths, vec![1, 2, 3, 2, 1]);
    }

    #[test]
    fn test_entry_and_boss_floors() {
        let mut rng = create_test_rng();
        for max_floors in 2..12 {
            let path = BranchingPathGenerator::new(RunConfig::new(max_floors, 2, 4))
                .generate(&mut rng);
            assert_eq!(path.floors.len(), max_floors);

            let entry = &path.floors[0];
            assert_eq!(entry.width(), 1);
            assert_eq!(entry.nodes[0].node_type, NodeType::Question);

            let boss = &path.floors[max_floors - 1];
            assert_eq!(boss.width(), 1);
            assert_eq!(boss.nodes[0].node_type, NodeType::Boss);
            assert_eq!(boss.nodes[0].difficulty, 3);
        }
    }

    #[test]
    fn test_every_node_connected() {
        let mut rng = create_test_rng();
        for _ in 0..100 {
            let path = BranchingPathGenerator::new(RunConfig::new(10, 2, 5)).generate(&mut rng);
            let incoming = incoming_ids(&path);
            let last = path.floors.len() - 1;

            for floor in &path.floors {
                for node in &floor.nodes {
                    if floor.index > 0 {
                        assert!(incoming.contains(&node.id), "{} unreachable", node.id);
                    }
                    if floor.index < last {
                        let outgoing = path.connections.get(&node.id).map_or(0, |t| t.len());
                        assert!(outgoing >= 1, "{} is a dead end", node.id);
                    }
                }
            }
        }
    }

    #[test]
    fn test_edges_only_to_next_floor() {
        let mut rng = create_test_rng();
        let path = BranchingPathGenerator::default().generate(&mut rng);
        for (source, targets) in &path.connections {
            let source_floor = path.node(source).unwrap().floor;
            for target in targets {
                assert_eq!(path.node(target).unwrap().floor, source_floor + 1);
            }
        }
    }

    #[test]
    fn test_boss_reachable_from_entry() {
        let mut rng = create_test_rng();
        for _ in 0..20 {
            let path = BranchingPathGenerator::default().generate(&mut rng);
            let entry = path.floors[0].nodes[0].id.clone();
            let mut seen = HashSet::from([entry.clone()]);
            let mut queue = VecDeque::from([entry]);
            while let Some(id) = queue.pop_front() {
                for next in path.connections.get(&id).into_iter().flatten() {
                    if seen.insert(next.clone()) {
                        queue.push_back(next.clone());
                    }
                }
            }
            assert_eq!(seen.len(), path.node_count());
        }
    }

    #[test]
    fn test_outgoing_edges_bounded() {
        let mut rng = create_test_rng();
        let path = BranchingPathGenerator::new(RunConfig::new(10, 4, 6)).generate(&mut rng);
        for pair in path.floors.windows(2) {
            if pair[0].width() == 1 || pair[1].width() == 1 {
                continue;
            }
            for node in &pair[0].nodes {
                let count = path.connections[&node.id].len();
                assert!((1..=pair[1].width()).contains(&count));
            }
        }
    }

    #[test]
    fn test_weights_normalized() {
        let generator = BranchingPathGenerator::default();
        for floor in 1..9 {
            for position in 0..4 {
                let weights = generator.node_weights(floor, position, 4);
                let total: f64 = weights.iter().sum();
                assert!((total - 1.0).abs() < 1e-9);
                assert!(weights.iter().all(|&w| w >= 0.0));
            }
        }
    }

    #[test]
    fn test_late_floors_favor_elites() {
        let generator = BranchingPathGenerator::default();
        let early = generator.node_weights(1, 1, 4);
        let late = generator.node_weights(8, 1, 4);
        assert!(late[W_ELITE] > early[W_ELITE]);
        assert!(late[W_QUESTION] < early[W_QUESTION]);
    }

    #[test]
    fn test_position_adjustments() {
        let generator = BranchingPathGenerator::default();
        let first = generator.node_weights(3, 0, 4);
        let middle = generator.node_weights(3, 1, 4);
        let last = generator.node_weights(3, 3, 4);
        assert!(first[W_REST] > middle[W_REST]);
        assert!(last[W_ELITE] > middle[W_ELITE]);
        assert!(last[W_TREASURE] > middle[W_TREASURE]);
    }

    #[test]
    fn test_difficulty_by_floor() {
        assert_eq!(difficulty_for(0, NodeType::Question), 1);
        assert_eq!(difficulty_for(2, NodeType::Question), 1);
        assert_eq!(difficulty_for(3, NodeType::Question), 2);
        assert_eq!(difficulty_for(6, NodeType::Rest), 3);
        assert_eq!(difficulty_for(20, NodeType::Question), 3);
        assert_eq!(difficulty_for(0, NodeType::Elite), 2);
        assert_eq!(difficulty_for(7, NodeType::Elite), 3);
        assert_eq!(difficulty_for(0, NodeType::Boss), 3);
    }

    #[test]
    fn test_same_seed_same_path() {
        let generator = BranchingPathGenerator::default();
        let a = generator.generate(&mut ChaCha8Rng::seed_from_u64(99));
        let b = generator.generate(&mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
