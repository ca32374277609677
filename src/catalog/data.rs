//! Built-in content used when no catalog directory is supplied.

use super::types::{
    AchievementDef, ChallengeMode, CharacterClass, Consumable, Effect, Encounter, EncounterKind,
    Perk, Rarity, Relic, ShopItem, ShopSlot,
};

pub fn default_classes() -> Vec<CharacterClass> {
    vec![
        CharacterClass {
            id: "resident".to_string(),
            name: "Resident".to_string(),
            description: "Balanced start with three lives.".to_string(),
            max_lives: 3,
            starting_insight: 0,
            starting_relic: None,
        },
        CharacterClass {
            id: "physicist".to_string(),
            name: "Physicist".to_string(),
            description: "Fewer lives, but starts with a dosimeter and some insight.".to_string(),
            max_lives: 2,
            starting_insight: 50,
            starting_relic: Some("pocket_dosimeter".to_string()),
        },
        CharacterClass {
            id: "technologist".to_string(),
            name: "Technologist".to_string(),
            description: "Sturdy: four lives, no starting insight.".to_string(),
            max_lives: 4,
            starting_insight: 0,
            starting_relic: None,
        },
    ]
}

pub fn default_relics() -> Vec<Relic> {
    vec![
        Relic {
            id: "pocket_dosimeter".to_string(),
            name: "Pocket Dosimeter".to_string(),
            description: "Always know your limits.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::ExperienceMultiplier { value: 1.1 },
            side_effect: None,
        },
        Relic {
            id: "lead_apron".to_string(),
            name: "Lead Apron".to_string(),
            description: "Heavy, but it keeps you going.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::MaxLivesBonus { value: 1 },
            side_effect: None,
        },
        Relic {
            id: "annotated_textbook".to_string(),
            name: "Annotated Textbook".to_string(),
            description: "Someone else's margin notes.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::ExperienceMultiplier { value: 1.25 },
            side_effect: None,
        },
        Relic {
            id: "linac_keycard".to_string(),
            name: "Linac Keycard".to_string(),
            description: "More insight from every reference.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::InsightMultiplier { value: 1.5 },
            side_effect: None,
        },
        Relic {
            id: "espresso_machine".to_string(),
            name: "Espresso Machine".to_string(),
            description: "Recover between floors.".to_string(),
            rarity: Rarity::Rare,
            effect: Effect::RecoverLifeBetweenFloors { value: 1 },
            side_effect: None,
        },
        Relic {
            id: "cursed_phantom".to_string(),
            name: "Cursed Phantom".to_string(),
            description: "Great teacher, terrible roommate.".to_string(),
            rarity: Rarity::Rare,
            effect: Effect::ExperienceMultiplier { value: 1.75 },
            side_effect: Some(Effect::MaxLivesPenalty { value: 1 }),
        },
    ]
}

pub fn default_perks() -> Vec<Perk> {
    vec![
        Perk {
            id: "steady_hands".to_string(),
            name: "Steady Hands".to_string(),
            description: "Mistakes hurt less.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::DamageReduction {
                value: 1,
                condition: Some("always".to_string()),
            },
        },
        Perk {
            id: "quick_study".to_string(),
            name: "Quick Study".to_string(),
            description: "Learn faster from every answer.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::ExperienceMultiplier { value: 1.2 },
        },
        Perk {
            id: "second_wind".to_string(),
            name: "Second Wind".to_string(),
            description: "Recover a life after each floor.".to_string(),
            rarity: Rarity::Rare,
            effect: Effect::RecoverLifeBetweenFloors { value: 1 },
        },
        Perk {
            id: "thick_skin".to_string(),
            name: "Thick Skin".to_string(),
            description: "One more life.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::MaxLivesBonus { value: 1 },
        },
        Perk {
            id: "bookworm".to_string(),
            name: "Bookworm".to_string(),
            description: "More insight from references.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::InsightMultiplier { value: 1.25 },
        },
        Perk {
            id: "boss_nerves".to_string(),
            name: "Boss Nerves".to_string(),
            description: "Shrug off damage, but only against the boss.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::DamageReduction {
                value: 1,
                condition: Some("boss_only".to_string()),
            },
        },
    ]
}

pub fn default_consumables() -> Vec<Consumable> {
    vec![
        Consumable {
            id: "coffee".to_string(),
            name: "Coffee".to_string(),
            description: "Restores a life.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::RestoreLife { value: 1 },
        },
        Consumable {
            id: "flashcards".to_string(),
            name: "Flashcards".to_string(),
            description: "A quick burst of experience.".to_string(),
            rarity: Rarity::Common,
            effect: Effect::GainExperience { value: 30 },
        },
        Consumable {
            id: "grant_voucher".to_string(),
            name: "Grant Voucher".to_string(),
            description: "Redeem for insight.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::GainInsight { value: 40 },
        },
        Consumable {
            id: "energy_drink".to_string(),
            name: "Energy Drink".to_string(),
            description: "Restores two lives.".to_string(),
            rarity: Rarity::Uncommon,
            effect: Effect::RestoreLife { value: 2 },
        },
        Consumable {
            id: "review_article".to_string(),
            name: "Review Article".to_string(),
            description: "Straight to the score sheet.".to_string(),
            rarity: Rarity::Rare,
            effect: Effect::ScoreBonus { value: 50 },
        },
    ]
}

pub fn default_encounters() -> Vec<Encounter> {
    vec![
        Encounter {
            id: "journal_club".to_string(),
            name: "Journal Club".to_string(),
            description: "A lively discussion leaves you wiser.".to_string(),
            kind: EncounterKind::Event {
                effect: Effect::GainExperience { value: 25 },
            },
        },
        Encounter {
            id: "machine_qa".to_string(),
            name: "Machine QA at Midnight".to_string(),
            description: "The output check fails twice before passing.".to_string(),
            kind: EncounterKind::Event {
                effect: Effect::GainInsight { value: -10 },
            },
        },
        Encounter {
            id: "hospital_cafe".to_string(),
            name: "Hospital Cafe".to_string(),
            description: "Spend insight on supplies.".to_string(),
            kind: EncounterKind::Shop {
                stock: vec![
                    ShopSlot {
                        item: ShopItem::Consumable("coffee".to_string()),
                        price: 20,
                    },
                    ShopSlot {
                        item: ShopItem::Consumable("flashcards".to_string()),
                        price: 25,
                    },
                    ShopSlot {
                        item: ShopItem::Relic("lead_apron".to_string()),
                        price: 75,
                    },
                ],
            },
        },
    ]
}

pub fn default_achievements() -> Vec<AchievementDef> {
    [
        ("first_run", "First Rotation", "Complete your first run", "🎓"),
        ("perfect_floor", "Perfect Floor", "Reach a floor without losing a life", "✨"),
        ("master_physicist", "Master Physicist", "Reach character level 10", "⚛️"),
        ("ironman", "Ironman", "Win a run without losing a life", "🛡️"),
        ("elite_slayer", "Elite Slayer", "Defeat 3 elites in one run", "⚔️"),
        ("hot_streak", "Hot Streak", "Answer 10 questions in a row correctly", "🔥"),
    ]
    .into_iter()
    .map(|(id, name, description, icon)| AchievementDef {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

pub fn default_challenge_modes() -> Vec<ChallengeMode> {
    vec![
        ChallengeMode {
            id: "ironman".to_string(),
            name: "Ironman".to_string(),
            description: "One life, double score.".to_string(),
            max_lives_override: Some(1),
            score_multiplier: 2.0,
            experience_multiplier: 1.0,
        },
        ChallengeMode {
            id: "study_mode".to_string(),
            name: "Study Mode".to_string(),
            description: "Half score, faster leveling.".to_string(),
            max_lives_override: None,
            score_multiplier: 0.5,
            experience_multiplier: 1.5,
        },
    ]
}
