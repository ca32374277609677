//! The operations a front end drives a run through.
//!
//! `GameSession` owns the shared catalog and question bank, the random
//! source, the active [`GameState`], and the player's cross-run progress.
//! Front ends read state through the accessors and change it only through
//! the methods here.

use super::outcomes::{
    AnswerOutcome, EffectResult, FloorProgress, NodeOutcome, Purchase, RunEnd,
};
use super::state::{GameState, OpenShop, RunPhase};
use crate::achievements::AchievementManager;
use crate::catalog::{Catalog, Perk, ShopItem};
use crate::character::Character;
use crate::core::{GameError, Result, RunConfig};
use crate::path::{BranchingPathGenerator, Node};
use crate::questions::{Question, QuestionBank};
use crate::save::{PlayerStats, SaveError, SaveManager};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// The active run, or the matching error when there is none.
fn active(state: &mut Option<GameState>) -> Result<&mut GameState> {
    let state = state.as_mut().ok_or(GameError::NoActiveRun)?;
    if state.is_completed() {
        return Err(GameError::RunAlreadyOver);
    }
    Ok(state)
}

/// Questions and perk choices must be resolved before the player moves on.
fn ensure_settled(state: &GameState) -> Result<()> {
    if !state.pending.questions.is_empty() {
        return Err(GameError::InteractionPending("a question is waiting"));
    }
    if !state.pending.perk_choices.is_empty() {
        return Err(GameError::InteractionPending("choose a perk"));
    }
    Ok(())
}

pub struct GameSession<R: Rng = StdRng> {
    catalog: Arc<Catalog>,
    questions: Arc<QuestionBank>,
    config: RunConfig,
    rng: R,
    state: Option<GameState>,
    achievements: AchievementManager,
    stats: PlayerStats,
    last_run: Option<RunEnd>,
    finalized: bool,
}

impl GameSession<StdRng> {
    /// A session seeded from system entropy.
    pub fn new(catalog: Arc<Catalog>, questions: Arc<QuestionBank>) -> Self {
        Self::with_rng(catalog, questions, StdRng::from_entropy())
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(catalog: Arc<Catalog>, questions: Arc<QuestionBank>, rng: R) -> Self {
        Self {
            catalog,
            questions,
            config: RunConfig::default(),
            rng,
            state: None,
            achievements: AchievementManager::new(),
            stats: PlayerStats::default(),
            last_run: None,
            finalized: false,
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config.normalized();
        self
    }

    /// Carries over achievements and aggregate stats from earlier sessions.
    pub fn with_progress(mut self, achievements: AchievementManager, stats: PlayerStats) -> Self {
        self.achievements = achievements;
        self.stats = stats;
        self
    }

    // === Accessors ===

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn question_bank(&self) -> &QuestionBank {
        &self.questions
    }

    pub fn config(&self) -> RunConfig {
        self.config
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn character(&self) -> Option<&Character> {
        self.state.as_ref().map(GameState::character)
    }

    pub fn phase(&self) -> Option<RunPhase> {
        self.state.as_ref().map(GameState::phase)
    }

    pub fn available_nodes(&self) -> Vec<&Node> {
        self.state
            .as_ref()
            .filter(|state| !state.is_completed())
            .map(GameState::get_available_nodes)
            .unwrap_or_default()
    }

    /// The question the next `answer_question` call will resolve.
    pub fn pending_question(&self) -> Option<&Question> {
        self.state.as_ref()?.pending.questions.front()
    }

    pub fn perk_choices(&self) -> &[Arc<Perk>] {
        self.state
            .as_ref()
            .map(|s| s.pending.perk_choices.as_slice())
            .unwrap_or(&[])
    }

    pub fn shop(&self) -> Option<&OpenShop> {
        self.state.as_ref()?.pending.shop.as_ref()
    }

    pub fn achievements(&self) -> &AchievementManager {
        &self.achievements
    }

    pub fn player_stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Result of the most recently finished run.
    pub fn last_run(&self) -> Option<&RunEnd> {
        self.last_run.as_ref()
    }

    // === Run lifecycle ===

    /// Starts a run with the class's display name as the character name.
    pub fn start_run(&mut self, class_id: &str) -> Result<&GameState> {
        let name = self
            .catalog
            .class(class_id)
            .map(|class| class.name.clone())
            .ok_or_else(|| GameError::UnknownClass(class_id.to_string()))?;
        self.start_run_with(&name, class_id, None)
    }

    /// Starts a run, replacing any run in progress.
    pub fn start_run_with(
        &mut self,
        name: &str,
        class_id: &str,
        challenge_id: Option<&str>,
    ) -> Result<&GameState> {
        let class = self
            .catalog
            .class(class_id)
            .ok_or_else(|| GameError::UnknownClass(class_id.to_string()))?;
        let challenge = challenge_id
            .map(|id| {
                self.catalog
                    .challenge_mode(id)
                    .ok_or_else(|| GameError::UnknownChallengeMode(id.to_string()))
            })
            .transpose()?;

        let mut character = Character::new(name.to_string(), &class);
        if let Some(relic_id) = &class.starting_relic {
            match self.catalog.relic(relic_id) {
                Some(relic) => character.add_relic(relic),
                None => tracing::warn!(
                    "Class {} references missing starting relic {}",
                    class.id,
                    relic_id
                ),
            }
        }

        let path = BranchingPathGenerator::new(self.config).generate(&mut self.rng);
        let mut state = GameState::new(character, path);
        if let Some(mode) = &challenge {
            state = state.with_challenge(mode);
        }

        tracing::info!(
            "Run started: {} the {} ({} floors{})",
            name,
            class.name,
            state.max_floor(),
            challenge
                .as_ref()
                .map(|m| format!(", {}", m.name))
                .unwrap_or_default()
        );
        self.stats.record_run_started();
        self.last_run = None;
        self.finalized = false;
        Ok(self.state.insert(state))
    }

    /// Resumes a previously saved run.
    pub fn resume(&mut self, mut state: GameState) {
        state.relink(&self.catalog);
        self.finalized = state.is_completed();
        self.last_run = state.summary().cloned().map(|summary| RunEnd {
            summary,
            new_achievements: Vec::new(),
        });
        self.state = Some(state);
    }

    /// Visits a node on the current floor and applies its effects.
    pub fn visit_node(&mut self, node_id: &str) -> Result<NodeOutcome> {
        let state = active(&mut self.state)?;
        ensure_settled(state)?;

        let node = state
            .node(node_id)
            .ok_or_else(|| GameError::NodeNotFound(node_id.to_string()))?;
        if node.is_visited() {
            return Err(GameError::NodeAlreadyVisited(node_id.to_string()));
        }
        if state.check_floor_completion() || !state.is_node_available(node_id) {
            return Err(GameError::NodeUnavailable(node_id.to_string()));
        }

        state.visit_node(node_id, &self.catalog, &self.questions, &mut self.rng);
        state
            .process_node_effects(node_id, &self.catalog, &mut self.rng)
            .ok_or_else(|| GameError::NodeUnavailable(node_id.to_string()))
    }

    /// Answers the pending question. The last answer of an elite or boss
    /// node also grants its reward.
    pub fn answer_question(&mut self, answer_index: usize) -> Result<AnswerOutcome> {
        let state = active(&mut self.state)?;
        let question = state
            .pending
            .questions
            .front()
            .ok_or(GameError::NoActiveQuestion)?;
        if answer_index >= question.options.len() {
            return Err(GameError::InvalidAnswer {
                index: answer_index,
                options: question.options.len(),
            });
        }
        let Some(question) = state.pending.questions.pop_front() else {
            return Err(GameError::NoActiveQuestion);
        };

        let mut outcome =
            state.answer_question(&question, answer_index, &self.catalog, &mut self.rng)?;
        if outcome.run_over {
            self.finish_run(false);
            return Ok(outcome);
        }

        if state.pending.questions.is_empty() {
            if let Some(reward) = state.pending.reward.take() {
                outcome.reward = Some(state.grant_reward(&reward, &self.catalog, &mut self.rng));
            }
        }
        Ok(outcome)
    }

    /// Picks one of the perks offered on level-up.
    pub fn select_perk(&mut self, perk_id: &str) -> Result<Arc<Perk>> {
        let state = active(&mut self.state)?;
        let perk = state
            .pending
            .perk_choices
            .iter()
            .find(|perk| perk.id == perk_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownPerk(perk_id.to_string()))?;

        state.character.add_perk(Arc::clone(&perk));
        state.pending.perk_choices.clear();
        Ok(perk)
    }

    /// Completes the current floor and moves on, or wins the run on the
    /// last floor.
    pub fn continue_after_node(&mut self) -> Result<FloorProgress> {
        let state = active(&mut self.state)?;
        ensure_settled(state)?;
        if !state.check_floor_completion() {
            return Err(GameError::InteractionPending("visit a node on this floor"));
        }

        state.pending.shop = None;
        let completion = state.complete_floor();
        if state.current_floor() >= state.max_floor() {
            let run_end = self.finish_run(true).ok_or(GameError::NoActiveRun)?;
            return Ok(FloorProgress::RunEnded(run_end));
        }

        state.advance_floor();
        Ok(FloorProgress::NextFloor {
            floor: state.current_floor(),
            completion,
        })
    }

    /// Ends the run as failed if the character has no lives left.
    pub fn end_run_if_defeated(&mut self) -> Option<RunEnd> {
        let defeated = self
            .state
            .as_ref()
            .is_some_and(|state| state.character().is_defeated());
        if defeated {
            self.finish_run(false)
        } else {
            None
        }
    }

    /// Uses the inventory item at `index`.
    pub fn use_item(&mut self, index: usize) -> Result<EffectResult> {
        let state = active(&mut self.state)?;
        let item = state
            .character
            .use_item(index)
            .ok_or(GameError::InvalidItemSlot(index))?;
        tracing::debug!("Used {}", item.id);
        Ok(state.apply_effect(&item.effect, &self.catalog, &mut self.rng))
    }

    /// Buys the item in `slot` of the open shop with insight.
    pub fn purchase(&mut self, slot: usize) -> Result<Purchase> {
        let state = active(&mut self.state)?;
        let shop = state.pending.shop.as_ref().ok_or(GameError::NoShopOpen)?;
        let entry = shop
            .stock
            .get(slot)
            .cloned()
            .ok_or(GameError::InvalidShopSlot(slot))?;

        let purchase = match &entry.item {
            ShopItem::Consumable(id) => self.catalog.consumable(id).map(Purchase::Consumable),
            ShopItem::Relic(id) => self
                .catalog
                .relic(id)
                .filter(|relic| !state.character.has_relic(&relic.id))
                .map(Purchase::Relic),
        }
        .ok_or(GameError::InvalidShopSlot(slot))?;

        if !state.character.spend_insight(entry.price) {
            return Err(GameError::InsufficientInsight {
                needed: entry.price,
                available: state.character.insight(),
            });
        }
        match &purchase {
            Purchase::Consumable(item) => state.character.add_item(Arc::clone(item)),
            Purchase::Relic(relic) => state.character.add_relic(Arc::clone(relic)),
        }
        if let Some(shop) = state.pending.shop.as_mut() {
            shop.stock.remove(slot);
        }
        Ok(purchase)
    }

    /// Ends the active run once: later calls return the stored result.
    fn finish_run(&mut self, success: bool) -> Option<RunEnd> {
        let state = self.state.as_mut()?;
        let summary = state.end_run(success);
        if self.finalized {
            return self.last_run.clone();
        }

        let new_achievements = self.achievements.check_run_achievements(state);
        self.stats.record_run_finished(&summary);
        let run_end = RunEnd {
            summary,
            new_achievements,
        };
        self.last_run = Some(run_end.clone());
        self.finalized = true;
        Some(run_end)
    }

    // === Persistence ===

    /// Saves the current run with the player's progress. Returns the save name.
    pub fn save(
        &self,
        manager: &SaveManager,
        name: Option<&str>,
    ) -> std::result::Result<String, SaveError> {
        let state = self.state.as_ref().ok_or(SaveError::NoActiveRun)?;
        manager.save_game(state, &self.stats, &self.achievements, name)
    }

    /// Loads a saved run and the progress stored with it.
    pub fn load(&mut self, manager: &SaveManager, name: &str) -> std::result::Result<(), SaveError> {
        let loaded = manager.load_game(name, &self.catalog)?;
        self.achievements = loaded.achievements;
        self.stats = loaded.player_stats;
        self.resume(loaded.game_state);
        Ok(())
    }
}
