//! Content record types loaded from the catalog files.

use serde::{Deserialize, Serialize};

/// Records stored in the catalog are looked up by a stable id.
pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record!(
    CharacterClass,
    Relic,
    Perk,
    Consumable,
    Encounter,
    AchievementDef,
    ChallengeMode,
);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Treasure rarity for a node difficulty: difficulty 0-1 is common, anything above uncommon.
    pub fn for_difficulty(difficulty: u8) -> Self {
        if difficulty <= 1 {
            Rarity::Common
        } else {
            Rarity::Uncommon
        }
    }
}

/// A passive or one-shot modifier carried by relics, perks, items and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Raises max and current lives when acquired.
    MaxLivesBonus { value: i32 },
    /// Lowers max lives when acquired (never below 1).
    MaxLivesPenalty { value: i32 },
    /// Subtracted from incoming damage while `condition` holds.
    DamageReduction {
        value: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
    /// Multiplies experience from correct answers.
    ExperienceMultiplier { value: f64 },
    /// Multiplies insight gained from nodes.
    InsightMultiplier { value: f64 },
    /// Restores lives whenever a floor is completed.
    RecoverLifeBetweenFloors { value: i32 },
    RestoreLife { value: i32 },
    GainInsight { value: i32 },
    GainExperience { value: u32 },
    ScoreBonus { value: i64 },
}

impl Effect {
    /// Damage reduction that applies unconditionally, if this is one.
    pub fn unconditional_damage_reduction(&self) -> Option<i32> {
        match self {
            Effect::DamageReduction { value, condition } => match condition.as_deref() {
                None | Some("always") => Some(*value),
                Some(_) => None,
            },
            _ => None,
        }
    }

    /// Short human-readable summary used in outcome payloads.
    pub fn describe(&self) -> String {
        match self {
            Effect::MaxLivesBonus { value } => format!("+{} max lives", value),
            Effect::MaxLivesPenalty { value } => format!("-{} max lives", value),
            Effect::DamageReduction { value, .. } => format!("-{} damage taken", value),
            Effect::ExperienceMultiplier { value } => format!("x{:.2} experience", value),
            Effect::InsightMultiplier { value } => format!("x{:.2} insight", value),
            Effect::RecoverLifeBetweenFloors { value } => {
                format!("recover {} lives between floors", value)
            }
            Effect::RestoreLife { value } => format!("restore {} lives", value),
            Effect::GainInsight { value } => format!("{:+} insight", value),
            Effect::GainExperience { value } => format!("+{} experience", value),
            Effect::ScoreBonus { value } => format!("{:+} score", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_lives: i32,
    #[serde(default)]
    pub starting_insight: i32,
    #[serde(default)]
    pub starting_relic: Option<String>,
}

/// Permanent passive modifier kept for the rest of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effect: Option<Effect>,
}

/// Ability chosen from the offered set on level-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perk {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub effect: Effect,
}

/// Single-use inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub effect: Effect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopItem {
    Consumable(String),
    Relic(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSlot {
    pub item: ShopItem,
    pub price: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncounterKind {
    /// Applies its effect as soon as the node is entered.
    Event { effect: Effect },
    /// Opens a shop until the player moves on.
    Shop { stock: Vec<ShopSlot> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: EncounterKind,
}

/// Display data for an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

fn one() -> f64 {
    1.0
}

/// Optional rule set applied at the start of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeMode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub max_lives_override: Option<i32>,
    #[serde(default = "one")]
    pub score_multiplier: f64,
    #[serde(default = "one")]
    pub experience_multiplier: f64,
}
