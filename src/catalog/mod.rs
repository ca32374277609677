//! Read-only game content: classes, relics, perks, consumables, encounters,
//! achievements and challenge modes, each keyed by a stable id.
//!
//! Records are stored behind `Arc` so characters can hold them without
//! copying; nothing in a run ever mutates a catalog record.

pub mod data;
pub mod loader;
pub mod types;

pub use types::{
    AchievementDef, ChallengeMode, CharacterClass, Consumable, Effect, Encounter, EncounterKind,
    Perk, Rarity, Record, Relic, ShopItem, ShopSlot,
};

use crate::core::constants::CATALOG_DIR_NAME;
use crate::utils::persistence::data_dir;
use loader::{
    load_records, ACHIEVEMENTS_KEY, CHALLENGE_MODES_KEY, CLASSES_KEY, CONSUMABLES_KEY,
    ENCOUNTERS_KEY, PERKS_KEY, RELICS_KEY,
};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `~/.physrogue/catalog`, where user content files live.
pub fn default_dir() -> io::Result<PathBuf> {
    Ok(data_dir()?.join(CATALOG_DIR_NAME))
}

type Table<T> = BTreeMap<String, Arc<T>>;

fn table<T: Record>(records: Vec<T>) -> Table<T> {
    records
        .into_iter()
        .map(|record| (record.id().to_string(), Arc::new(record)))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: Table<CharacterClass>,
    relics: Table<Relic>,
    perks: Table<Perk>,
    consumables: Table<Consumable>,
    encounters: Table<Encounter>,
    achievements: Table<AchievementDef>,
    challenge_modes: Table<ChallengeMode>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in content set.
    pub fn builtin() -> Self {
        Self {
            classes: table(data::default_classes()),
            relics: table(data::default_relics()),
            perks: table(data::default_perks()),
            consumables: table(data::default_consumables()),
            encounters: table(data::default_encounters()),
            achievements: table(data::default_achievements()),
            challenge_modes: table(data::default_challenge_modes()),
        }
    }

    /// Loads one JSON file per collection from `dir`.
    pub fn load_from_dir(dir: &Path) -> Self {
        let catalog = Self {
            classes: table(load_records(dir, CLASSES_KEY)),
            relics: table(load_records(dir, RELICS_KEY)),
            perks: table(load_records(dir, PERKS_KEY)),
            consumables: table(load_records(dir, CONSUMABLES_KEY)),
            encounters: table(load_records(dir, ENCOUNTERS_KEY)),
            achievements: table(load_records(dir, ACHIEVEMENTS_KEY)),
            challenge_modes: table(load_records(dir, CHALLENGE_MODES_KEY)),
        };
        tracing::info!(
            "Loaded catalog from {}: {} classes, {} relics, {} perks, {} consumables, {} encounters",
            dir.display(),
            catalog.classes.len(),
            catalog.relics.len(),
            catalog.perks.len(),
            catalog.consumables.len(),
            catalog.encounters.len()
        );
        catalog
    }

    // === Lookups ===

    pub fn class(&self, id: &str) -> Option<Arc<CharacterClass>> {
        self.classes.get(id).cloned()
    }

    pub fn relic(&self, id: &str) -> Option<Arc<Relic>> {
        self.relics.get(id).cloned()
    }

    pub fn perk(&self, id: &str) -> Option<Arc<Perk>> {
        self.perks.get(id).cloned()
    }

    pub fn consumable(&self, id: &str) -> Option<Arc<Consumable>> {
        self.consumables.get(id).cloned()
    }

    pub fn encounter(&self, id: &str) -> Option<Arc<Encounter>> {
        self.encounters.get(id).cloned()
    }

    pub fn achievement(&self, id: &str) -> Option<Arc<AchievementDef>> {
        self.achievements.get(id).cloned()
    }

    pub fn challenge_mode(&self, id: &str) -> Option<Arc<ChallengeMode>> {
        self.challenge_modes.get(id).cloned()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<CharacterClass>> {
        self.classes.values()
    }

    pub fn perks(&self) -> impl Iterator<Item = &Arc<Perk>> {
        self.perks.values()
    }

    // === Insertion (content tooling and tests) ===

    pub fn insert_class(&mut self, class: CharacterClass) {
        self.classes.insert(class.id.clone(), Arc::new(class));
    }

    pub fn insert_relic(&mut self, relic: Relic) {
        self.relics.insert(relic.id.clone(), Arc::new(relic));
    }

    pub fn insert_perk(&mut self, perk: Perk) {
        self.perks.insert(perk.id.clone(), Arc::new(perk));
    }

    pub fn insert_consumable(&mut self, consumable: Consumable) {
        self.consumables
            .insert(consumable.id.clone(), Arc::new(consumable));
    }

    pub fn insert_encounter(&mut self, encounter: Encounter) {
        self.encounters
            .insert(encounter.id.clone(), Arc::new(encounter));
    }

    // === Random draws ===

    /// A consumable of `rarity`, or of any rarity if none match.
    pub fn random_consumable(&self, rarity: Rarity, rng: &mut impl Rng) -> Option<Arc<Consumable>> {
        self.consumables
            .values()
            .filter(|c| c.rarity == rarity)
            .choose(rng)
            .or_else(|| self.consumables.values().choose(rng))
            .cloned()
    }

    /// A relic of `rarity` not listed in `owned`, relaxing the rarity if needed.
    pub fn random_relic(
        &self,
        rarity: Rarity,
        owned: &[&str],
        rng: &mut impl Rng,
    ) -> Option<Arc<Relic>> {
        let unowned = || {
            self.relics
                .values()
                .filter(|r| !owned.contains(&r.id.as_str()))
        };
        unowned()
            .filter(|r| r.rarity == rarity)
            .choose(rng)
            .or_else(|| unowned().choose(rng))
            .cloned()
    }

    /// Up to `count` distinct perks not listed in `owned`.
    pub fn random_perks(&self, count: usize, owned: &[&str], rng: &mut impl Rng) -> Vec<Arc<Perk>> {
        self.perks
            .values()
            .filter(|p| !owned.contains(&p.id.as_str()))
            .cloned()
            .choose_multiple(rng, count)
    }

    pub fn random_encounter(&self, rng: &mut impl Rng) -> Option<Arc<Encounter>> {
        self.encounters.values().choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    #[test]
    fn test_builtin_lookups() {
        let catalog = Catalog::builtin();
        assert!(catalog.class("resident").is_some());
        assert!(catalog.relic("lead_apron").is_some());
        assert!(catalog.perk("steady_hands").is_some());
        assert!(catalog.consumable("coffee").is_some());
        assert!(catalog.encounter("hospital_cafe").is_some());
        assert!(catalog.achievement("first_run").is_some());
        assert!(catalog.challenge_mode("ironman").is_some());
        assert!(catalog.class("wizard").is_none());
    }

    #[test]
    fn test_builtin_starting_relics_exist() {
        let catalog = Catalog::builtin();
        for class in catalog.classes() {
            if let Some(relic_id) = &class.starting_relic {
                assert!(
                    catalog.relic(relic_id).is_some(),
                    "class {} references missing relic {}",
                    class.id,
                    relic_id
                );
            }
        }
    }

    #[test]
    fn test_lookups_share_records() {
        let catalog = Catalog::builtin();
        let a = catalog.relic("lead_apron").unwrap();
        let b = catalog.relic("lead_apron").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_random_consumable_respects_rarity() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        for _ in 0..50 {
            let item = catalog.random_consumable(Rarity::Common, &mut rng).unwrap();
            assert_eq!(item.rarity, Rarity::Common);
        }
    }

    #[test]
    fn test_random_consumable_falls_back_to_any_rarity() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        assert!(catalog
            .random_consumable(Rarity::Legendary, &mut rng)
            .is_some());
        assert!(Catalog::new()
            .random_consumable(Rarity::Common, &mut rng)
            .is_none());
    }

    #[test]
    fn test_random_relic_skips_owned() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let owned = ["lead_apron", "annotated_textbook"];
        for _ in 0..50 {
            let relic = catalog
                .random_relic(Rarity::Uncommon, &owned, &mut rng)
                .unwrap();
            assert!(!owned.contains(&relic.id.as_str()));
        }
    }

    #[test]
    fn test_random_perks_are_distinct_and_unowned() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let perks = catalog.random_perks(3, &["steady_hands"], &mut rng);
        assert_eq!(perks.len(), 3);
        assert!(perks.iter().all(|p| p.id != "steady_hands"));

        let mut ids: Vec<&str> = perks.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_random_perks_caps_at_available() {
        let catalog = Catalog::builtin();
        let mut rng = create_test_rng();
        let all: Vec<&str> = catalog.perks().map(|p| p.id.as_str()).collect();
        let owned = &all[1..];
        let perks = catalog.random_perks(3, owned, &mut rng);
        assert_eq!(perks.len(), 1);
    }

    #[test]
    fn test_load_from_empty_dir_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load_from_dir(dir.path());
        assert!(catalog.class("resident").is_none());
        assert!(dir.path().join("classes.json").exists());
        assert!(dir.path().join("challenge_modes.json").exists());
    }

    #[test]
    fn test_load_from_dir_reads_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("classes.json"),
            r#"{"classes": [{"id": "intern", "name": "Intern", "max_lives": 2}]}"#,
        )
        .unwrap();

        let catalog = Catalog::load_from_dir(dir.path());
        let class = catalog.class("intern").unwrap();
        assert_eq!(class.max_lives, 2);
        assert_eq!(class.starting_insight, 0);
    }
}
