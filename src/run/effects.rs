//! Node content generation and effect resolution.

use super::outcomes::{EffectResult, EncounterOutcome, NodeOutcome, Reward, RewardGranted};
use super::state::{GameState, OpenShop};
use crate::catalog::{Catalog, Effect, EncounterKind, Perk, Rarity};
use crate::core::balance::{
    BOSS_QUESTION_DIFFICULTIES, ELITE_QUESTION_COUNT, PERK_CHOICES_ON_LEVEL_UP,
    REFERENCE_BASE_INSIGHT, REFERENCE_INSIGHT_PER_DIFFICULTY, REST_LIFE_RESTORE,
    ROTATION_INSIGHT_PER_FLOOR,
};
use crate::path::{Node, NodeContent, NodeType};
use crate::questions::QuestionBank;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Builds the content for a node on its first visit. Drawn questions are
/// added to `asked` so later draws prefer fresh ones.
pub(super) fn generate_content(
    node: &Node,
    catalog: &Catalog,
    bank: &QuestionBank,
    asked: &mut BTreeSet<String>,
    rng: &mut impl Rng,
) -> NodeContent {
    match node.node_type {
        NodeType::Question => {
            let question = bank.draw(&node.category, node.difficulty, asked, rng);
            asked.insert(question.id.clone());
            NodeContent::Question { question }
        }
        NodeType::Reference => NodeContent::Reference {
            insight: REFERENCE_BASE_INSIGHT
                + REFERENCE_INSIGHT_PER_DIFFICULTY * node.difficulty as i32,
        },
        NodeType::Rest => NodeContent::Rest {
            lives: REST_LIFE_RESTORE,
        },
        NodeType::Treasure => NodeContent::Treasure {
            rarity: Rarity::for_difficulty(node.difficulty),
        },
        NodeType::Elite => {
            let difficulties = [node.difficulty; ELITE_QUESTION_COUNT];
            let questions = bank.draw_many(&node.category, &difficulties, asked, rng);
            asked.extend(questions.iter().map(|q| q.id.clone()));
            NodeContent::Elite {
                questions,
                reward_rarity: Rarity::Uncommon,
            }
        }
        NodeType::Boss => {
            let questions =
                bank.draw_many(&node.category, &BOSS_QUESTION_DIFFICULTIES, asked, rng);
            asked.extend(questions.iter().map(|q| q.id.clone()));
            NodeContent::Boss { questions }
        }
        NodeType::Encounter => NodeContent::Encounter {
            encounter_id: catalog.random_encounter(rng).map(|e| e.id.clone()),
        },
    }
}

impl GameState {
    /// Applies a visited node's effects, one handler per node type.
    ///
    /// Immediate effects (insight, rest, treasure, events) are applied here.
    /// Question nodes queue their questions, and elites and the boss queue a
    /// reward granted once every question is answered. Returns `None` if the
    /// node is unknown, unvisited, or already resolved.
    pub fn process_node_effects(
        &mut self,
        node_id: &str,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> Option<NodeOutcome> {
        let node = self.node(node_id)?;
        if !node.is_visited() {
            return None;
        }
        let content = node.content()?.clone();
        if !self.mark_resolved(node_id) {
            return None;
        }

        let outcome = match content {
            NodeContent::Question { question } => {
                self.pending.questions = vec![question.clone()].into();
                self.pending.reward = None;
                NodeOutcome::Question { question }
            }
            NodeContent::Reference { insight } => {
                let insight_gained =
                    (insight as f64 * self.character.insight_multiplier()).round() as i32;
                self.character.add_insight(insight_gained);
                NodeOutcome::Reference { insight_gained }
            }
            NodeContent::Rest { lives } => NodeOutcome::Rest {
                lives_restored: self.character.restore_life(lives),
            },
            NodeContent::Treasure { rarity } => {
                let item = catalog.random_consumable(rarity, rng);
                if let Some(item) = &item {
                    self.character.add_item(Arc::clone(item));
                }
                NodeOutcome::Treasure { rarity, item }
            }
            NodeContent::Elite {
                questions,
                reward_rarity,
            } => {
                let reward = Reward::Relic {
                    rarity: reward_rarity,
                };
                self.pending.questions = questions.iter().cloned().collect();
                self.pending.reward = Some(reward.clone());
                NodeOutcome::Elite { questions, reward }
            }
            NodeContent::Boss { questions } => {
                let reward = Reward::CompleteRotation {
                    floor: self.current_floor,
                };
                self.pending.questions = questions.iter().cloned().collect();
                self.pending.reward = Some(reward.clone());
                NodeOutcome::Boss { questions, reward }
            }
            NodeContent::Encounter { encounter_id } => {
                NodeOutcome::Encounter(self.resolve_encounter(encounter_id.as_deref(), catalog, rng))
            }
        };
        Some(outcome)
    }

    fn resolve_encounter(
        &mut self,
        encounter_id: Option<&str>,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> EncounterOutcome {
        let Some(encounter) = encounter_id.and_then(|id| catalog.encounter(id)) else {
            return EncounterOutcome::Quiet;
        };

        match &encounter.kind {
            EncounterKind::Event { effect } => {
                let result = self.apply_effect(effect, catalog, rng);
                tracing::debug!("Encounter {}: {}", encounter.id, result.description);
                EncounterOutcome::Event { encounter, result }
            }
            EncounterKind::Shop { stock } => {
                let stock = stock.clone();
                self.pending.shop = Some(OpenShop {
                    encounter_id: encounter.id.clone(),
                    stock: stock.clone(),
                });
                EncounterOutcome::Shop { encounter, stock }
            }
        }
    }

    /// Applies a one-shot effect from an event or consumable. Passive effects
    /// only act while attached to a relic or perk, so they do nothing here.
    pub fn apply_effect(
        &mut self,
        effect: &Effect,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> EffectResult {
        let mut levels_gained = 0;
        match effect {
            Effect::RestoreLife { value } => {
                self.character.restore_life(*value);
            }
            Effect::GainInsight { value } => {
                let amount = if *value > 0 {
                    (*value as f64 * self.character.insight_multiplier()).round() as i32
                } else {
                    *value
                };
                self.character.add_insight(amount);
            }
            Effect::GainExperience { value } => {
                let multiplier =
                    self.character.experience_multiplier() * self.challenge_experience_multiplier();
                levels_gained = self.character.gain_experience(*value, multiplier);
            }
            Effect::ScoreBonus { value } => {
                self.score += value;
            }
            other => {
                tracing::debug!("Effect {:?} has no one-shot behaviour", other);
            }
        }

        let perk_choices = if levels_gained > 0 {
            self.offer_perks(catalog, rng)
        } else {
            Vec::new()
        };
        EffectResult {
            description: effect.describe(),
            levels_gained,
            perk_choices,
        }
    }

    /// Samples perks the character does not own and holds them as the
    /// pending choice.
    pub(super) fn offer_perks(&mut self, catalog: &Catalog, rng: &mut impl Rng) -> Vec<Arc<Perk>> {
        let owned = self.character.perk_ids();
        let choices = catalog.random_perks(PERK_CHOICES_ON_LEVEL_UP, &owned, rng);
        self.pending.perk_choices = choices.clone();
        choices
    }

    /// Grants an elite or boss reward.
    pub fn grant_reward(
        &mut self,
        reward: &Reward,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> RewardGranted {
        match reward {
            Reward::Relic { rarity } => {
                let owned = self.character.relic_ids();
                let relic = catalog.random_relic(*rarity, &owned, rng);
                if let Some(relic) = &relic {
                    self.character.add_relic(Arc::clone(relic));
                }
                self.path_history.record_elite_defeated();
                RewardGranted::Relic(relic)
            }
            Reward::CompleteRotation { floor } => {
                let insight = ROTATION_INSIGHT_PER_FLOOR * *floor as i32;
                self.character.add_insight(insight);
                tracing::info!("Rotation complete on floor {}", floor);
                RewardGranted::Rotation {
                    floor: *floor,
                    insight,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Consumable, Encounter, ShopItem, ShopSlot};
    use crate::character::Character;
    use crate::core::RunConfig;
    use crate::path::{BranchingPathGenerator, Floor, GeneratedPath};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn character(catalog: &Catalog) -> Character {
        Character::new("Tester".to_string(), &catalog.class("resident").unwrap())
    }

    /// A state whose floor 2 holds a single node of `node_type`.
    fn state_with_node(node_type: NodeType, catalog: &Catalog) -> GameState {
        let entry = Node::new(NodeType::Question, 0, 0, 1, "dosimetry".to_string());
        let node = Node::new(node_type, 1, 0, 2, "dosimetry".to_string());
        let boss = Node::new(NodeType::Boss, 2, 0, 3, "dosimetry".to_string());
        let floors = vec![
            Floor {
                index: 0,
                nodes: vec![entry],
            },
            Floor {
                index: 1,
                nodes: vec![node],
            },
            Floor {
                index: 2,
                nodes: vec![boss],
            },
        ];
        let mut state = GameState::new(
            character(catalog),
            GeneratedPath {
                floors,
                connections: Default::default(),
            },
        );
        state.current_floor = 2;
        state
    }

    fn visit_and_process(
        state: &mut GameState,
        catalog: &Catalog,
        rng: &mut ChaCha8Rng,
    ) -> NodeOutcome {
        let bank = QuestionBank::builtin();
        state.visit_node("f1_n0", catalog, &bank, rng).unwrap();
        state.process_node_effects("f1_n0", catalog, rng).unwrap()
    }

    #[test]
    fn test_reference_grants_insight() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Reference, &catalog);

        let outcome = visit_and_process(&mut state, &catalog, &mut rng);
        assert_eq!(outcome, NodeOutcome::Reference { insight_gained: 30 });
        assert_eq!(state.character().insight(), 30);
    }

    #[test]
    fn test_reference_uses_insight_multiplier() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Reference, &catalog);
        state
            .character
            .add_relic(catalog.relic("linac_keycard").unwrap());

        visit_and_process(&mut state, &catalog, &mut rng);
        assert_eq!(state.character().insight(), 45);
    }

    #[test]
    fn test_rest_restores_life() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Rest, &catalog);
        state.character.take_damage(2);

        let outcome = visit_and_process(&mut state, &catalog, &mut rng);
        assert_eq!(outcome, NodeOutcome::Rest { lives_restored: 1 });
        assert_eq!(state.character().lives(), 2);
    }

    #[test]
    fn test_treasure_adds_uncommon_item() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Treasure, &catalog);

        match visit_and_process(&mut state, &catalog, &mut rng) {
            NodeOutcome::Treasure { rarity, item } => {
                assert_eq!(rarity, Rarity::Uncommon);
                assert_eq!(item.unwrap().rarity, Rarity::Uncommon);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(state.character().inventory().len(), 1);
    }

    #[test]
    fn test_elite_queues_two_questions_and_relic() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Elite, &catalog);

        match visit_and_process(&mut state, &catalog, &mut rng) {
            NodeOutcome::Elite { questions, reward } => {
                assert_eq!(questions.len(), 2);
                assert!(questions.iter().all(|q| q.category == "dosimetry"));
                assert_eq!(
                    reward,
                    Reward::Relic {
                        rarity: Rarity::Uncommon
                    }
                );
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(state.pending().questions.len(), 2);
        assert!(state.pending().reward.is_some());
    }

    #[test]
    fn test_boss_escalates_difficulty() {
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Rest, &catalog);
        state.current_floor = 3;

        state.visit_node("f2_n0", &catalog, &bank, &mut rng).unwrap();
        match state.process_node_effects("f2_n0", &catalog, &mut rng) {
            Some(NodeOutcome::Boss { questions, reward }) => {
                let difficulties: Vec<u8> = questions.iter().map(|q| q.difficulty).collect();
                assert_eq!(difficulties, vec![1, 2, 3]);
                assert_eq!(reward, Reward::CompleteRotation { floor: 3 });
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_effects_apply_once() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Reference, &catalog);

        visit_and_process(&mut state, &catalog, &mut rng);
        assert!(state
            .process_node_effects("f1_n0", &catalog, &mut rng)
            .is_none());
        assert_eq!(state.character().insight(), 30);
    }

    #[test]
    fn test_unvisited_node_has_no_effects() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Reference, &catalog);
        assert!(state
            .process_node_effects("f1_n0", &catalog, &mut rng)
            .is_none());
    }

    #[test]
    fn test_shop_encounter_opens_shop() {
        let mut catalog = Catalog::new();
        catalog.insert_class(crate::catalog::data::default_classes().remove(0));
        catalog.insert_encounter(Encounter {
            id: "vending".to_string(),
            name: "Vending Machine".to_string(),
            description: String::new(),
            kind: EncounterKind::Shop {
                stock: vec![ShopSlot {
                    item: ShopItem::Consumable("coffee".to_string()),
                    price: 10,
                }],
            },
        });
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Encounter, &catalog);

        match visit_and_process(&mut state, &catalog, &mut rng) {
            NodeOutcome::Encounter(EncounterOutcome::Shop { stock, .. }) => {
                assert_eq!(stock.len(), 1)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(state.pending().shop.as_ref().unwrap().encounter_id, "vending");
    }

    #[test]
    fn test_event_encounter_applies_effect() {
        let mut catalog = Catalog::new();
        catalog.insert_class(crate::catalog::data::default_classes().remove(0));
        catalog.insert_encounter(Encounter {
            id: "award".to_string(),
            name: "Teaching Award".to_string(),
            description: String::new(),
            kind: EncounterKind::Event {
                effect: Effect::ScoreBonus { value: 75 },
            },
        });
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Encounter, &catalog);

        visit_and_process(&mut state, &catalog, &mut rng);
        assert_eq!(state.score(), 75);
    }

    #[test]
    fn test_empty_catalog_encounter_is_quiet() {
        let mut catalog = Catalog::new();
        catalog.insert_class(crate::catalog::data::default_classes().remove(0));
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Encounter, &catalog);

        assert_eq!(
            visit_and_process(&mut state, &catalog, &mut rng),
            NodeOutcome::Encounter(EncounterOutcome::Quiet)
        );
    }

    #[test]
    fn test_experience_effect_offers_perks() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Rest, &catalog);

        let result = state.apply_effect(&Effect::GainExperience { value: 150 }, &catalog, &mut rng);
        assert_eq!(result.levels_gained, 1);
        assert_eq!(result.perk_choices.len(), PERK_CHOICES_ON_LEVEL_UP);
        assert_eq!(state.pending().perk_choices, result.perk_choices);
    }

    #[test]
    fn test_item_effect_restores_life() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Rest, &catalog);
        state.character.take_damage(2);
        let coffee: Arc<Consumable> = catalog.consumable("coffee").unwrap();

        state.apply_effect(&coffee.effect, &catalog, &mut rng);
        assert_eq!(state.character().lives(), 2);
    }

    #[test]
    fn test_relic_reward_counts_elite() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let mut state = state_with_node(NodeType::Elite, &catalog);

        let granted = state.grant_reward(
            &Reward::Relic {
                rarity: Rarity::Uncommon,
            },
            &catalog,
            &mut rng,
        );
        match granted {
            RewardGranted::Relic(Some(relic)) => assert!(state.character().has_relic(&relic.id)),
            other => panic!("unexpected reward {:?}", other),
        }
        assert_eq!(state.path_history().elites_defeated(), 1);
    }

    #[test]
    fn test_generated_runs_resolve_every_node_type() {
        let catalog = Catalog::builtin();
        let bank = QuestionBank::builtin();
        let mut rng = create_test_rng();
        let generated = BranchingPathGenerator::new(RunConfig::default()).generate(&mut rng);
        let mut state = GameState::new(character(&catalog), generated);

        let ids: Vec<String> = state
            .path()
            .iter()
            .flat_map(|f| f.nodes.iter().map(|n| n.id.clone()))
            .collect();
        for id in ids {
            state.visit_node(&id, &catalog, &bank, &mut rng).unwrap();
            assert!(state.process_node_effects(&id, &catalog, &mut rng).is_some());
        }
    }
}
