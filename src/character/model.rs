//! Per-run character state: lives, insight, experience, perks, relics and
//! inventory.
//!
//! Fields are private so the clamping rules below always hold:
//! `0 <= lives <= max_lives`, `max_lives >= 1`, `insight >= 0`,
//! `experience < experience_to_next_level`.

use crate::catalog::{Catalog, CharacterClass, Consumable, Effect, Perk, Relic};
use crate::core::balance::{BASE_EXPERIENCE_TO_LEVEL, LEVEL_THRESHOLD_GROWTH};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub class_id: String,
    lives: i32,
    max_lives: i32,
    insight: i32,
    level: u32,
    experience: u32,
    experience_to_next_level: u32,
    #[serde(default)]
    active_perks: Vec<Arc<Perk>>,
    #[serde(default)]
    inventory: Vec<Arc<Consumable>>,
    #[serde(default)]
    relics: Vec<Arc<Relic>>,
}

impl Character {
    /// Creates a level 1 character from a class definition.
    ///
    /// The class's starting relic is not attached here; callers look it up in
    /// the catalog and pass it to [`Character::add_relic`].
    pub fn new(name: String, class: &CharacterClass) -> Self {
        use uuid::Uuid;

        let max_lives = class.max_lives.max(1);
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            class_id: class.id.clone(),
            lives: max_lives,
            max_lives,
            insight: class.starting_insight.max(0),
            level: 1,
            experience: 0,
            experience_to_next_level: BASE_EXPERIENCE_TO_LEVEL,
            active_perks: Vec::new(),
            inventory: Vec::new(),
            relics: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn max_lives(&self) -> i32 {
        self.max_lives
    }

    pub fn insight(&self) -> i32 {
        self.insight
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn experience_to_next_level(&self) -> u32 {
        self.experience_to_next_level
    }

    pub fn active_perks(&self) -> &[Arc<Perk>] {
        &self.active_perks
    }

    pub fn inventory(&self) -> &[Arc<Consumable>] {
        &self.inventory
    }

    pub fn relics(&self) -> &[Arc<Relic>] {
        &self.relics
    }

    pub fn is_defeated(&self) -> bool {
        self.lives == 0
    }

    pub fn is_at_full_lives(&self) -> bool {
        self.lives == self.max_lives
    }

    pub fn has_perk(&self, id: &str) -> bool {
        self.active_perks.iter().any(|p| p.id == id)
    }

    pub fn has_relic(&self, id: &str) -> bool {
        self.relics.iter().any(|r| r.id == id)
    }

    pub fn perk_ids(&self) -> Vec<&str> {
        self.active_perks.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn relic_ids(&self) -> Vec<&str> {
        self.relics.iter().map(|r| r.id.as_str()).collect()
    }

    // === Experience ===

    /// Adds `round(amount * multiplier)` experience. Each time the threshold
    /// is crossed it is consumed, the level goes up, and the threshold grows
    /// by 20%. Returns the number of level-ups.
    pub fn gain_experience(&mut self, amount: u32, multiplier: f64) -> u32 {
        let gained = (amount as f64 * multiplier.max(0.0)).round() as u32;
        self.experience = self.experience.saturating_add(gained);

        let mut levels = 0;
        while self.experience >= self.experience_to_next_level {
            self.experience -= self.experience_to_next_level;
            self.level += 1;
            self.experience_to_next_level = next_threshold(self.experience_to_next_level);
            levels += 1;
        }

        if levels > 0 {
            tracing::debug!(
                "{} reached level {} (+{} levels)",
                self.name,
                self.level,
                levels
            );
        }
        levels
    }

    /// Combined experience multiplier from relics and perks.
    pub fn experience_multiplier(&self) -> f64 {
        self.effects()
            .filter_map(|effect| match effect {
                Effect::ExperienceMultiplier { value } => Some(*value),
                _ => None,
            })
            .product()
    }

    /// Combined insight multiplier from relics and perks.
    pub fn insight_multiplier(&self) -> f64 {
        self.effects()
            .filter_map(|effect| match effect {
                Effect::InsightMultiplier { value } => Some(*value),
                _ => None,
            })
            .product()
    }

    /// Lives recovered when a floor is completed.
    pub fn floor_recovery(&self) -> i32 {
        self.effects()
            .filter_map(|effect| match effect {
                Effect::RecoverLifeBetweenFloors { value } => Some(*value),
                _ => None,
            })
            .sum()
    }

    /// Every active effect: relic effects, relic side effects, perk effects.
    fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.relics
            .iter()
            .flat_map(|r| std::iter::once(&r.effect).chain(r.side_effect.as_ref()))
            .chain(self.active_perks.iter().map(|p| &p.effect))
    }

    // === Lives ===

    /// Applies `amount` damage after unconditional damage-reduction perks.
    /// Returns true if the character is now defeated.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let reduction: i32 = self
            .active_perks
            .iter()
            .filter_map(|p| p.effect.unconditional_damage_reduction())
            .sum();
        let damage = (amount - reduction).max(0);
        self.lives = (self.lives - damage).max(0);
        self.is_defeated()
    }

    /// Restores up to `amount` lives, capped at max. Returns lives restored.
    pub fn restore_life(&mut self, amount: i32) -> i32 {
        let before = self.lives;
        self.lives = (self.lives + amount.max(0)).min(self.max_lives);
        self.lives - before
    }

    /// Overrides max lives (challenge modes) and refills.
    pub fn set_max_lives(&mut self, max_lives: i32) {
        self.max_lives = max_lives.max(1);
        self.lives = self.max_lives;
    }

    fn apply_max_lives_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::MaxLivesBonus { value } => {
                self.max_lives = (self.max_lives + value).max(1);
                self.lives += (*value).max(0);
            }
            Effect::MaxLivesPenalty { value } => {
                self.max_lives = (self.max_lives - value).max(1);
            }
            _ => {}
        }
        self.lives = self.lives.clamp(0, self.max_lives);
    }

    // === Insight ===

    /// Adds (or, if negative, removes) insight. Never drops below zero.
    pub fn add_insight(&mut self, amount: i32) {
        self.insight = (self.insight + amount).max(0);
    }

    /// Spends `cost` insight if affordable.
    pub fn spend_insight(&mut self, cost: i32) -> bool {
        if cost < 0 || cost > self.insight {
            return false;
        }
        self.insight -= cost;
        true
    }

    // === Relics, perks, inventory ===

    /// Attaches a relic and applies its max-lives effects immediately.
    pub fn add_relic(&mut self, relic: Arc<Relic>) {
        self.apply_max_lives_effect(&relic.effect);
        if let Some(side_effect) = &relic.side_effect {
            self.apply_max_lives_effect(side_effect);
        }
        tracing::debug!("{} gained relic {}", self.name, relic.id);
        self.relics.push(relic);
    }

    /// Adds a perk, applying max-lives effects immediately. Returns false if
    /// the perk is already active.
    pub fn add_perk(&mut self, perk: Arc<Perk>) -> bool {
        if self.has_perk(&perk.id) {
            return false;
        }
        self.apply_max_lives_effect(&perk.effect);
        tracing::debug!("{} gained perk {}", self.name, perk.id);
        self.active_perks.push(perk);
        true
    }

    pub fn add_item(&mut self, item: Arc<Consumable>) {
        self.inventory.push(item);
    }

    /// Removes and returns the item at `index`, or `None` if out of range.
    pub fn use_item(&mut self, index: usize) -> Option<Arc<Consumable>> {
        if index < self.inventory.len() {
            Some(self.inventory.remove(index))
        } else {
            None
        }
    }

    // === Persistence support ===

    /// Swaps deserialized records for the shared catalog copies where the id
    /// still exists, and re-establishes the clamping rules.
    pub fn relink(&mut self, catalog: &Catalog) {
        for perk in &mut self.active_perks {
            if let Some(shared) = catalog.perk(&perk.id) {
                *perk = shared;
            }
        }
        for relic in &mut self.relics {
            if let Some(shared) = catalog.relic(&relic.id) {
                *relic = shared;
            }
        }
        for item in &mut self.inventory {
            if let Some(shared) = catalog.consumable(&item.id) {
                *item = shared;
            }
        }

        self.max_lives = self.max_lives.max(1);
        self.lives = self.lives.clamp(0, self.max_lives);
        self.insight = self.insight.max(0);
        self.level = self.level.max(1);
        self.experience_to_next_level = self.experience_to_next_level.max(1);
    }
}

fn next_threshold(current: u32) -> u32 {
    ((current as f64 * LEVEL_THRESHOLD_GROWTH).floor() as u32).max(current + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rarity;

    fn test_class(max_lives: i32) -> CharacterClass {
        CharacterClass {
            id: "resident".to_string(),
            name: "Resident".to_string(),
            description: String::new(),
            max_lives,
            starting_insight: 0,
            starting_relic: None,
        }
    }

    fn test_character(max_lives: i32) -> Character {
        Character::new("Test Resident".to_string(), &test_class(max_lives))
    }

    fn perk(id: &str, effect: Effect) -> Arc<Perk> {
        Arc::new(Perk {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effect,
        })
    }

    fn relic(id: &str, effect: Effect, side_effect: Option<Effect>) -> Arc<Relic> {
        Arc::new(Relic {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effect,
            side_effect,
        })
    }

    #[test]
    fn test_new_character() {
        let character = test_character(3);
        assert_eq!(character.level(), 1);
        assert_eq!(character.experience(), 0);
        assert_eq!(character.experience_to_next_level(), 100);
        assert_eq!(character.lives(), 3);
        assert_eq!(character.max_lives(), 3);
        assert_eq!(character.id.len(), 36);
    }

    #[test]
    fn test_damage_sequence_to_defeat() {
        let mut character = test_character(3);
        assert!(!character.take_damage(1));
        assert_eq!(character.lives(), 2);
        assert!(!character.take_damage(1));
        assert_eq!(character.lives(), 1);
        assert!(character.take_damage(1));
        assert_eq!(character.lives(), 0);
    }

    #[test]
    fn test_multi_level_jump() {
        let mut character = test_character(3);
        let levels = character.gain_experience(250, 1.0);
        assert_eq!(levels, 2);
        assert_eq!(character.level(), 3);
        assert_eq!(character.experience(), 30);
        assert_eq!(character.experience_to_next_level(), 144);
    }

    #[test]
    fn test_split_awards_match_single_award() {
        let mut single = test_character(3);
        single.gain_experience(1000, 1.0);

        let mut split = test_character(3);
        let mut levels = 0;
        for chunk in [100, 1, 333, 66, 250, 250] {
            levels += split.gain_experience(chunk, 1.0);
        }

        assert_eq!(levels, single.level() - 1);
        assert_eq!(split.level(), single.level());
        assert_eq!(split.experience(), single.experience());
        assert_eq!(
            split.experience_to_next_level(),
            single.experience_to_next_level()
        );
    }

    #[test]
    fn test_experience_multiplier_rounds() {
        let mut character = test_character(3);
        character.gain_experience(15, 1.5);
        assert_eq!(character.experience(), 23);
    }

    #[test]
    fn test_damage_reduction_perk() {
        let mut character = test_character(3);
        character.add_perk(perk(
            "steady_hands",
            Effect::DamageReduction {
                value: 1,
                condition: None,
            },
        ));
        assert!(!character.take_damage(1));
        assert_eq!(character.lives(), 3);
        character.take_damage(3);
        assert_eq!(character.lives(), 1);
    }

    #[test]
    fn test_conditional_reduction_ignored() {
        let mut character = test_character(3);
        character.add_perk(perk(
            "boss_nerves",
            Effect::DamageReduction {
                value: 1,
                condition: Some("boss_only".to_string()),
            },
        ));
        character.take_damage(1);
        assert_eq!(character.lives(), 2);
    }

    #[test]
    fn test_lives_stay_clamped() {
        let mut character = test_character(3);
        let steps = [5, -2, 1, 1, -10, 3, 0, 2, -1];
        for step in steps {
            if step >= 0 {
                character.take_damage(step);
            } else {
                character.restore_life(-step);
            }
            assert!(character.lives() >= 0);
            assert!(character.lives() <= character.max_lives());
        }
    }

    #[test]
    fn test_restore_life_caps_at_max() {
        let mut character = test_character(3);
        character.take_damage(2);
        assert_eq!(character.restore_life(5), 2);
        assert_eq!(character.lives(), 3);
    }

    #[test]
    fn test_relic_max_lives_bonus() {
        let mut character = test_character(3);
        character.add_relic(relic("apron", Effect::MaxLivesBonus { value: 2 }, None));
        assert_eq!(character.max_lives(), 5);
        assert_eq!(character.lives(), 5);
        assert!(character.has_relic("apron"));
    }

    #[test]
    fn test_relic_side_effect_penalty() {
        let mut character = test_character(3);
        character.add_relic(relic(
            "phantom",
            Effect::ExperienceMultiplier { value: 1.5 },
            Some(Effect::MaxLivesPenalty { value: 1 }),
        ));
        assert_eq!(character.max_lives(), 2);
        assert_eq!(character.lives(), 2);
        assert!((character.experience_multiplier() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_bonus_never_below_one() {
        let mut character = test_character(3);
        character.add_relic(relic("cursed", Effect::MaxLivesBonus { value: -5 }, None));
        assert_eq!(character.max_lives(), 1);
        assert_eq!(character.lives(), 1);
        assert!(!character.is_defeated());
    }

    #[test]
    fn test_penalty_never_below_one() {
        let mut character = test_character(2);
        character.add_relic(relic(
            "anchor",
            Effect::GainInsight { value: 0 },
            Some(Effect::MaxLivesPenalty { value: 5 }),
        ));
        assert_eq!(character.max_lives(), 1);
        assert_eq!(character.lives(), 1);
    }

    #[test]
    fn test_duplicate_perk_rejected() {
        let mut character = test_character(3);
        let thick_skin = perk("thick_skin", Effect::MaxLivesBonus { value: 1 });
        assert!(character.add_perk(thick_skin.clone()));
        assert!(!character.add_perk(thick_skin));
        assert_eq!(character.max_lives(), 4);
    }

    #[test]
    fn test_insight_never_negative() {
        let mut character = test_character(3);
        character.add_insight(30);
        character.add_insight(-50);
        assert_eq!(character.insight(), 0);
        assert!(!character.spend_insight(1));
        character.add_insight(20);
        assert!(character.spend_insight(20));
        assert_eq!(character.insight(), 0);
    }

    #[test]
    fn test_use_item() {
        let mut character = test_character(3);
        character.add_item(Arc::new(Consumable {
            id: "coffee".to_string(),
            name: "Coffee".to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effect: Effect::RestoreLife { value: 1 },
        }));
        assert!(character.use_item(1).is_none());
        assert_eq!(character.use_item(0).map(|i| i.id.clone()).as_deref(), Some("coffee"));
        assert!(character.inventory().is_empty());
    }

    #[test]
    fn test_floor_recovery_sums_sources() {
        let mut character = test_character(3);
        character.add_perk(perk("second_wind", Effect::RecoverLifeBetweenFloors { value: 1 }));
        character.add_relic(relic(
            "espresso",
            Effect::RecoverLifeBetweenFloors { value: 1 },
            None,
        ));
        assert_eq!(character.floor_recovery(), 2);
    }

    #[test]
    fn test_relink_shares_catalog_records() {
        let catalog = Catalog::builtin();
        let mut character = test_character(3);
        let copy = Arc::new((*catalog.relic("linac_keycard").unwrap()).clone());
        character.add_relic(copy);

        character.relink(&catalog);
        assert!(Arc::ptr_eq(
            &character.relics()[0],
            &catalog.relic("linac_keycard").unwrap()
        ));
    }
}
