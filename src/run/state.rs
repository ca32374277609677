//! Per-run state and the floor-by-floor lifecycle.
//!
//! A node moves through: awaiting visit, content resolved, then either an
//! immediate result or one or more pending questions, then the floor check,
//! and finally the next floor or the end of the run.

use super::outcomes::{FloorCompletion, Reward, RunSummary};
use crate::catalog::{Catalog, ChallengeMode, Perk, ShopSlot};
use crate::character::Character;
use crate::core::balance::{SCORE_PER_FLOOR, SCORE_PER_LIFE, VICTORY_SCORE_BONUS};
use crate::path::{Connections, Floor, GeneratedPath, Node, PathHistory};
use crate::questions::{Question, QuestionBank};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// An encounter shop the player can buy from until they move on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenShop {
    pub encounter_id: String,
    pub stock: Vec<ShopSlot>,
}

/// Interactions started by a node that must be resolved before moving on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingInteraction {
    pub questions: VecDeque<Question>,
    pub reward: Option<Reward>,
    pub perk_choices: Vec<Arc<Perk>>,
    pub shop: Option<OpenShop>,
}

/// Coarse state for the UI to decide what to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    AwaitingVisit,
    QuestionPending,
    ChoosingPerk,
    Shopping,
    FloorCleared,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) character: Character,
    /// 1-based; floor `n` is `path[n - 1]`.
    pub(crate) current_floor: u32,
    pub(crate) max_floor: u32,
    pub(crate) path: Vec<Floor>,
    pub(crate) connections: Connections,
    pub(crate) visited_nodes: BTreeSet<String>,
    /// Nodes whose effects have already been applied.
    #[serde(default)]
    pub(crate) resolved_nodes: BTreeSet<String>,
    pub(crate) score: i64,
    #[serde(default)]
    pub(crate) streak: u32,
    #[serde(default)]
    pub(crate) best_streak: u32,
    #[serde(default)]
    pub(crate) questions_answered: u32,
    #[serde(default)]
    pub(crate) correct_answers: u32,
    #[serde(default)]
    pub(crate) lives_lost: u32,
    #[serde(default)]
    pub(crate) asked_questions: BTreeSet<String>,
    #[serde(default)]
    pub(crate) path_history: PathHistory,
    pub(crate) is_completed: bool,
    pub(crate) is_successful: bool,
    pub(crate) start_time: i64,
    #[serde(default)]
    pub(crate) end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) challenge: Option<ChallengeMode>,
    #[serde(default)]
    pub(crate) pending: PendingInteraction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<RunSummary>,
}

/// Finds a node by id across every floor.
fn find_node_mut<'a>(path: &'a mut [Floor], node_id: &str) -> Option<&'a mut Node> {
    path.iter_mut()
        .flat_map(|floor| floor.nodes.iter_mut())
        .find(|node| node.id == node_id)
}

impl GameState {
    pub fn new(character: Character, generated: GeneratedPath) -> Self {
        let max_floor = generated.floors.len().max(1) as u32;
        Self {
            character,
            current_floor: 1,
            max_floor,
            path: generated.floors,
            connections: generated.connections,
            visited_nodes: BTreeSet::new(),
            resolved_nodes: BTreeSet::new(),
            score: 0,
            streak: 0,
            best_streak: 0,
            questions_answered: 0,
            correct_answers: 0,
            lives_lost: 0,
            asked_questions: BTreeSet::new(),
            path_history: PathHistory::new(),
            is_completed: false,
            is_successful: false,
            start_time: Utc::now().timestamp(),
            end_time: None,
            challenge: None,
            pending: PendingInteraction::default(),
            summary: None,
        }
    }

    /// Applies a challenge mode's rules. The max-lives override refills lives.
    pub fn with_challenge(mut self, mode: &ChallengeMode) -> Self {
        if let Some(max_lives) = mode.max_lives_override {
            self.character.set_max_lives(max_lives);
        }
        self.challenge = Some(mode.clone());
        self
    }

    // === Accessors ===

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    pub fn max_floor(&self) -> u32 {
        self.max_floor
    }

    pub fn path(&self) -> &[Floor] {
        &self.path
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn visited_nodes(&self) -> &BTreeSet<String> {
        &self.visited_nodes
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Lives lost to wrong answers over the whole run.
    pub fn lives_lost(&self) -> u32 {
        self.lives_lost
    }

    pub fn asked_questions(&self) -> &BTreeSet<String> {
        &self.asked_questions
    }

    pub fn path_history(&self) -> &PathHistory {
        &self.path_history
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_time(&self) -> Option<i64> {
        self.end_time
    }

    pub fn challenge(&self) -> Option<&ChallengeMode> {
        self.challenge.as_ref()
    }

    pub fn pending(&self) -> &PendingInteraction {
        &self.pending
    }

    /// Summary stored by the first `end_run` call.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.path
            .iter()
            .flat_map(|floor| floor.nodes.iter())
            .find(|node| node.id == node_id)
    }

    pub fn current_floor_nodes(&self) -> &[Node] {
        self.path
            .get((self.current_floor as usize).saturating_sub(1))
            .map(|floor| floor.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn phase(&self) -> RunPhase {
        if self.is_completed {
            RunPhase::Ended
        } else if !self.pending.perk_choices.is_empty() {
            RunPhase::ChoosingPerk
        } else if !self.pending.questions.is_empty() {
            RunPhase::QuestionPending
        } else if self.pending.shop.is_some() {
            RunPhase::Shopping
        } else if self.check_floor_completion() {
            RunPhase::FloorCleared
        } else {
            RunPhase::AwaitingVisit
        }
    }

    // === Node lifecycle ===

    /// Marks a node visited, records it, and generates its content on first
    /// visit. Returns `None` if the node does not exist, was already
    /// visited, or the run is over.
    pub fn visit_node(
        &mut self,
        node_id: &str,
        catalog: &Catalog,
        bank: &QuestionBank,
        rng: &mut impl Rng,
    ) -> Option<&Node> {
        if self.is_completed {
            return None;
        }
        let node = find_node_mut(&mut self.path, node_id)?;
        if !node.mark_visited() {
            return None;
        }
        if node.content().is_none() {
            let content =
                super::effects::generate_content(node, catalog, bank, &mut self.asked_questions, rng);
            node.set_content_once(content);
        }

        self.visited_nodes.insert(node.id.clone());
        self.path_history
            .record_visit(node, self.current_floor, Utc::now().timestamp());
        tracing::debug!(
            "Visited {} ({}) on floor {}",
            node.id,
            node.node_type.name(),
            self.current_floor
        );
        self.node(node_id)
    }

    /// True once any node on the current floor has been visited.
    pub fn check_floor_completion(&self) -> bool {
        self.current_floor_nodes().iter().any(Node::is_visited)
    }

    /// Applies between-floor recovery and records the completed floor.
    pub fn complete_floor(&mut self) -> FloorCompletion {
        let lives_recovered = self.character.restore_life(self.character.floor_recovery());
        self.path_history.record_floor_completion(self.current_floor);
        tracing::debug!(
            "Floor {} complete, recovered {} lives",
            self.current_floor,
            lives_recovered
        );
        FloorCompletion {
            floor: self.current_floor,
            lives_recovered,
        }
    }

    /// Moves to the next floor. Returns false on the last floor.
    pub fn advance_floor(&mut self) -> bool {
        if self.current_floor >= self.max_floor {
            return false;
        }
        self.current_floor += 1;
        self.pending.shop = None;
        true
    }

    /// Nodes the player may pick on the current floor: every node on floor 1,
    /// otherwise the targets of visited nodes on the previous floor. Without
    /// connection data every node on the floor is available.
    pub fn get_available_nodes(&self) -> Vec<&Node> {
        let nodes = self.current_floor_nodes();
        if self.current_floor <= 1 || self.connections.is_empty() {
            return nodes.iter().collect();
        }

        let Some(previous) = self.path.get(self.current_floor as usize - 2) else {
            return nodes.iter().collect();
        };
        let reachable: BTreeSet<&str> = previous
            .nodes
            .iter()
            .filter(|node| node.is_visited())
            .filter_map(|node| self.connections.get(&node.id))
            .flat_map(|targets| targets.iter().map(String::as_str))
            .collect();

        nodes
            .iter()
            .filter(|node| reachable.contains(node.id.as_str()))
            .collect()
    }

    pub fn is_node_available(&self, node_id: &str) -> bool {
        self.get_available_nodes().iter().any(|n| n.id == node_id)
    }

    // === Run end ===

    /// Ends the run and computes the final score:
    /// `score + 500 (if success) + floor * 50 + lives * 20`, scaled by the
    /// challenge multiplier. Later calls return the stored summary unchanged.
    pub fn end_run(&mut self, success: bool) -> RunSummary {
        if self.is_completed {
            if let Some(summary) = &self.summary {
                return summary.clone();
            }
        }

        let end_time = Utc::now().timestamp();
        self.is_completed = true;
        self.is_successful = success;
        self.end_time = Some(end_time);
        self.pending = PendingInteraction::default();

        let mut final_score = self.score
            + self.current_floor as i64 * SCORE_PER_FLOOR
            + self.character.lives() as i64 * SCORE_PER_LIFE;
        if success {
            final_score += VICTORY_SCORE_BONUS;
        }
        if let Some(mode) = &self.challenge {
            final_score = (final_score as f64 * mode.score_multiplier).round() as i64;
        }

        let summary = RunSummary {
            success,
            final_score,
            floor_reached: self.current_floor,
            lives_remaining: self.character.lives(),
            level: self.character.level(),
            questions_answered: self.questions_answered,
            correct_answers: self.correct_answers,
            best_streak: self.best_streak,
            duration_seconds: (end_time - self.start_time).max(0),
            statistics: self.path_history.statistics(),
        };
        tracing::info!(
            "Run ended ({}): score {} on floor {}",
            if success { "victory" } else { "defeat" },
            final_score,
            self.current_floor
        );
        self.summary = Some(summary.clone());
        summary
    }

    // === Internal bookkeeping ===

    /// Marks a node's effects applied. Returns false if they already were.
    pub(super) fn mark_resolved(&mut self, node_id: &str) -> bool {
        self.resolved_nodes.insert(node_id.to_string())
    }

    pub(super) fn record_correct(&mut self) -> u32 {
        self.questions_answered += 1;
        self.correct_answers += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.streak
    }

    pub(super) fn record_incorrect(&mut self) {
        self.questions_answered += 1;
        self.streak = 0;
    }

    pub(super) fn record_life_lost(&mut self, lives: u32) {
        self.lives_lost += lives;
    }

    /// Challenge experience multiplier, 1.0 without a challenge.
    pub(super) fn challenge_experience_multiplier(&self) -> f64 {
        self.challenge
            .as_ref()
            .map_or(1.0, |mode| mode.experience_multiplier)
    }

    /// Re-shares catalog records after deserialization.
    pub fn relink(&mut self, catalog: &Catalog) {
        self.character.relink(catalog);
        for perk in &mut self.pending.perk_choices {
            if let Some(shared) = catalog.perk(&perk.id) {
                *perk = shared;
            }
        }
        self.current_floor = self.current_floor.clamp(1, self.max_floor.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RunConfig;
    use crate::path::{BranchingPathGenerator, NodeType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn test_state(max_floors: usize, rng: &mut ChaCha8Rng) -> GameState {
        let catalog = Catalog::builtin();
        let class = catalog.class("resident").unwrap();
        let character = Character::new("Tester".to_string(), &class);
        let generator = BranchingPathGenerator::new(RunConfig::new(max_floors, 2, 4));
        GameState::new(character, generator.generate(rng))
    }

    #[test]
    fn test_new_state_starts_on_floor_one() {
        let mut rng = create_test_rng();
        let state = test_state(5, &mut rng);
        assert_eq!(state.current_floor(), 1);
        assert_eq!(state.max_floor(), 5);
        assert_eq!(state.score(), 0);
        assert!(!state.is_completed());
        assert_eq!(state.phase(), RunPhase::AwaitingVisit);
    }

    #[test]
    fn test_visit_node_generates_content_once() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut state = test_state(5, &mut rng);

        let node = state
            .visit_node("f0_n0", &catalog, &bank, &mut rng)
            .unwrap();
        assert!(node.is_visited());
        assert!(node.content().is_some());
        assert!(state.visited_nodes().contains("f0_n0"));
        assert_eq!(state.path_history().visits().len(), 1);
        assert_eq!(state.asked_questions().len(), 1);

        assert!(state
            .visit_node("f0_n0", &catalog, &bank, &mut rng)
            .is_none());
        assert!(state
            .visit_node("missing", &catalog, &bank, &mut rng)
            .is_none());
        assert_eq!(state.path_history().visits().len(), 1);
    }

    #[test]
    fn test_floor_completion_needs_one_visit() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut state = test_state(5, &mut rng);

        assert!(!state.check_floor_completion());
        state.visit_node("f0_n0", &catalog, &bank, &mut rng);
        assert!(state.check_floor_completion());
        assert!(state.advance_floor());
        assert!(!state.check_floor_completion());

        let first = state.current_floor_nodes()[0].id.clone();
        state.visit_node(&first, &catalog, &bank, &mut rng);
        assert!(state.check_floor_completion());
    }

    #[test]
    fn test_available_nodes_follow_connections() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut state = test_state(10, &mut rng);

        assert_eq!(state.get_available_nodes().len(), 1);
        state.visit_node("f0_n0", &catalog, &bank, &mut rng);
        state.advance_floor();
        assert_eq!(
            state.get_available_nodes().len(),
            state.current_floor_nodes().len()
        );

        let picked = state.get_available_nodes()[0].id.clone();
        state.visit_node(&picked, &catalog, &bank, &mut rng);
        state.advance_floor();

        let expected = &state.connections()[&picked];
        let available: BTreeSet<String> = state
            .get_available_nodes()
            .iter()
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(&available, expected);
    }

    #[test]
    fn test_available_nodes_without_connections() {
        let mut rng = create_test_rng();
        let mut state = test_state(5, &mut rng);
        state.connections.clear();
        state.advance_floor();
        assert_eq!(
            state.get_available_nodes().len(),
            state.current_floor_nodes().len()
        );
    }

    #[test]
    fn test_advance_stops_at_last_floor() {
        let mut rng = create_test_rng();
        let mut state = test_state(3, &mut rng);
        assert!(state.advance_floor());
        assert!(state.advance_floor());
        assert!(!state.advance_floor());
        assert_eq!(state.current_floor(), 3);
        assert_eq!(state.current_floor_nodes()[0].node_type, NodeType::Boss);
    }

    #[test]
    fn test_end_run_score_formula() {
        let mut rng = create_test_rng();
        let mut state = test_state(5, &mut rng);
        state.score += 120;
        state.advance_floor();

        let summary = state.end_run(true);
        assert!(state.is_completed());
        assert!(state.is_successful());
        assert!(state.end_time().is_some());
        assert_eq!(summary.final_score, 120 + 500 + 2 * 50 + 3 * 20);
        assert_eq!(state.phase(), RunPhase::Ended);
    }

    #[test]
    fn test_end_run_is_guarded() {
        let mut rng = create_test_rng();
        let mut state = test_state(5, &mut rng);
        let first = state.end_run(false);
        state.score += 1000;
        let second = state.end_run(true);
        assert_eq!(first, second);
        assert!(!state.is_successful());
    }

    #[test]
    fn test_challenge_multiplies_final_score() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let ironman = catalog.challenge_mode("ironman").unwrap();
        let mut state = test_state(5, &mut rng).with_challenge(&ironman);
        assert_eq!(state.character().max_lives(), 1);

        let summary = state.end_run(false);
        assert_eq!(summary.final_score, (50 + 20) * 2);
    }

    #[test]
    fn test_complete_floor_applies_recovery() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let mut state = test_state(5, &mut rng);
        state.character.add_perk(catalog.perk("second_wind").unwrap());
        state.character.take_damage(2);

        let completion = state.complete_floor();
        assert_eq!(completion.lives_recovered, 1);
        assert_eq!(state.character().lives(), 2);
        assert_eq!(state.path_history().floors_completed(), 1);
    }

    #[test]
    fn test_state_json_round_trip() {
        let mut rng = create_test_rng();
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut state = test_state(5, &mut rng);
        state.visit_node("f0_n0", &catalog, &bank, &mut rng);

        let json = serde_json::to_string(&state).unwrap();
        let mut restored: GameState = serde_json::from_str(&json).unwrap();
        restored.relink(&catalog);
        assert_eq!(restored, state);
    }
}
