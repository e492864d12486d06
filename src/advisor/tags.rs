use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Closed vocabulary for profile tags. Free-form strings from learned
/// profile files parse into `Other`, which no rule ever matches, so the
/// rule tables below stay exhaustive over known variants.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(from = "String", into = "String")]
pub enum Tag {
    // Draft coverage wants
    Stun,
    Initiator,
    Save,
    Dispel,
    Waveclear,
    Vision,
    Roshan,
    TowerDamage,
    Mobility,
    AuraCarrier,
    Scale,
    // Synergy themes
    MinusArmor,
    MagicAmp,
    Summons,
    Aura,
    // Counter vocabulary
    SustainHeals,
    Burst,
    Splitpush,
    Catch,
    MagicBurst,
    PipeAura,
    PhysicalDamage,
    ArmorAura,
    AntiHeal,
    // Item-role tags
    CoreBkb,
    Greaves,
    Pipe,
    Assault,
    Vladmir,
    CrimsonGuard,
    #[strum(default)]
    Other(String),
}

impl Tag {
    /// Human-readable form for reason strings ("tower_damage" -> "tower damage").
    pub fn words(&self) -> String {
        self.to_string().replace('_', " ")
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::from_str(&s).unwrap_or(Tag::Other(s))
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

/// Tags a draft wants covered, in display order.
pub const WANT_TAGS: [Tag; 11] = [
    Tag::Stun,
    Tag::Initiator,
    Tag::Save,
    Tag::Dispel,
    Tag::Waveclear,
    Tag::Vision,
    Tag::Roshan,
    Tag::TowerDamage,
    Tag::Mobility,
    Tag::AuraCarrier,
    Tag::Scale,
];

/// Fixed priority used to order "team needs" (differs from WANT_TAGS order).
pub const NEED_PRIORITY: [Tag; 11] = [
    Tag::Stun,
    Tag::Dispel,
    Tag::Save,
    Tag::Waveclear,
    Tag::Vision,
    Tag::Initiator,
    Tag::Roshan,
    Tag::TowerDamage,
    Tag::Mobility,
    Tag::AuraCarrier,
    Tag::Scale,
];

/// A theme that pays off when both an existing ally and the candidate
/// carry it.
pub struct SynergyTheme {
    pub tag: Tag,
    pub label: &'static str,
}

pub const SYNERGY_THEMES: [SynergyTheme; 5] = [
    SynergyTheme {
        tag: Tag::MinusArmor,
        label: "Synergy: Minus Armor",
    },
    SynergyTheme {
        tag: Tag::MagicAmp,
        label: "Synergy: Magic Amp",
    },
    SynergyTheme {
        tag: Tag::Summons,
        label: "Synergy: Summons/Push",
    },
    SynergyTheme {
        tag: Tag::Aura,
        label: "Synergy: Auras",
    },
    SynergyTheme {
        tag: Tag::Mobility,
        label: "Synergy: Mobility",
    },
];

/// `enemy` tag answered by the candidate's `answer` tag.
pub struct CounterRule {
    pub enemy: Tag,
    pub answer: Tag,
    pub label: &'static str,
}

pub const COUNTER_RULES: [CounterRule; 4] = [
    CounterRule {
        enemy: Tag::SustainHeals,
        answer: Tag::Burst,
        label: "Counters Sustain",
    },
    CounterRule {
        enemy: Tag::Splitpush,
        answer: Tag::Catch,
        label: "Counters Splitpush",
    },
    CounterRule {
        enemy: Tag::MagicBurst,
        answer: Tag::PipeAura,
        label: "Counters Magic Burst",
    },
    CounterRule {
        enemy: Tag::PhysicalDamage,
        answer: Tag::ArmorAura,
        label: "Counters Physical",
    },
];

/// Tags that mark a profile as already committing a team aura slot.
pub const AURA_COMMIT_TAGS: [Tag; 6] = [
    Tag::AuraCarrier,
    Tag::Greaves,
    Tag::Pipe,
    Tag::Assault,
    Tag::Vladmir,
    Tag::CrimsonGuard,
];
