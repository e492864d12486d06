use crate::advisor::curve::{default_curve_by_role, Curve};
use crate::advisor::tags::Tag;
use crate::api::models::{BenchmarkResultDto, Hero, HeroRole};
use crate::draft::DraftPick;
use crate::error::AppError;
use crate::matrix::builder::HeroId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// A notable power moment on a profile's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub minute: u32,
    pub description: String,
}

/// Hero play-style descriptor: positions, tag vocabulary, power curve.
/// Learned profiles come from the profile book on disk; heroes without
/// one get a single synthesized default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub hero_id: HeroId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub positions: Vec<u8>,
    #[serde(default)]
    pub play_style: String,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    #[serde(default)]
    pub item_build: Vec<String>,
    #[serde(default)]
    pub spikes: Vec<Spike>,
    #[serde(default)]
    pub curve: Curve,
}

impl Profile {
    /// First preferred position, defaulting to a mid/off core hint.
    pub fn role_hint(&self) -> u8 {
        self.positions.first().copied().unwrap_or(2)
    }

    /// Curve read by scoring and team math; profiles without curve data
    /// borrow the generic default. Meta rankings deliberately skip this
    /// fallback.
    pub fn curve_or_default(&self) -> Curve {
        if self.curve.is_empty() {
            crate::advisor::curve::default_curve()
        } else {
            self.curve.clone()
        }
    }
}

/// Default tag set synthesized from provider role strings.
pub fn default_tags(roles: &[HeroRole]) -> BTreeSet<Tag> {
    let mut tags = BTreeSet::new();
    if roles.contains(&HeroRole::Carry) {
        tags.extend([Tag::CoreBkb, Tag::Scale, Tag::TowerDamage]);
    }
    if roles.contains(&HeroRole::Support) {
        tags.extend([Tag::Save, Tag::Vision, Tag::Waveclear]);
    }
    if roles.contains(&HeroRole::Initiator) {
        tags.extend([Tag::Initiator, Tag::Stun]);
    }
    if roles.contains(&HeroRole::Durable) {
        tags.insert(Tag::AuraCarrier);
    }
    tags
}

fn default_positions(roles: &[HeroRole]) -> Vec<u8> {
    if roles.contains(&HeroRole::Support) {
        vec![4, 5]
    } else if roles.contains(&HeroRole::Carry) {
        vec![1]
    } else {
        vec![2, 3]
    }
}

/// The one synthesis rule for heroes without learned profiles. Every
/// fallback in the crate goes through here.
pub fn default_profile(hero: &Hero) -> Profile {
    Profile {
        id: format!("{}-default", hero.id),
        hero_id: hero.id,
        name: format!("{} Default", hero.name),
        role: hero
            .roles
            .first()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "Core".to_string()),
        positions: default_positions(&hero.roles),
        play_style: "Adaptive".to_string(),
        tags: default_tags(&hero.roles),
        item_build: Vec::new(),
        spikes: vec![
            Spike { minute: 10, description: "Level 10".to_string() },
            Spike { minute: 20, description: "Level 20".to_string() },
        ],
        curve: default_curve_by_role(&hero.roles),
    }
}

fn placeholder_hero(id: HeroId) -> Hero {
    Hero {
        id,
        name: format!("Hero {}", id),
        roles: Vec::new(),
        icon: String::new(),
    }
}

/// Per-hero profile collection backed by a JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBook {
    pub profiles_by_hero: BTreeMap<HeroId, Vec<Profile>>,
}

impl ProfileBook {
    /// Load the book; a missing file is an empty book, a malformed one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(_) => Ok(ProfileBook::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        crate::matrix::snapshot::save_json_atomic(path, self)
    }

    /// Synthesize a default book covering the whole roster.
    pub fn synthesize(heroes: &[Hero]) -> Self {
        ProfileBook {
            profiles_by_hero: heroes
                .iter()
                .map(|h| (h.id, vec![default_profile(h)]))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles_by_hero.is_empty()
    }

    /// Learned profiles for a hero, or the synthesized default. Always
    /// non-empty.
    pub fn resolve(&self, hero: &Hero) -> Vec<Profile> {
        match self.profiles_by_hero.get(&hero.id) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => vec![default_profile(hero)],
        }
    }

    /// First profile for a hero (the one a plain pick plays).
    pub fn primary(&self, hero: &Hero) -> Profile {
        match self.profiles_by_hero.get(&hero.id).and_then(|l| l.first()) {
            Some(p) => p.clone(),
            None => default_profile(hero),
        }
    }

    /// Profile a draft pick plays: the explicit one if the draft set
    /// it, else the hero's primary. Unknown hero ids degrade to an
    /// unbiased default so team math stays total.
    pub fn resolve_pick(&self, pick: &DraftPick, heroes: &[Hero]) -> Profile {
        if let Some(profile) = &pick.profile {
            return profile.clone();
        }
        match heroes.iter().find(|h| h.id == pick.hero_id) {
            Some(hero) => self.primary(hero),
            None => default_profile(&placeholder_hero(pick.hero_id)),
        }
    }
}

/// Normalize a benchmark series to a 0-100 six-point curve. Samples the
/// series at six evenly spaced fractions; an empty series gets a
/// generic ramp.
fn normalize_benchmark(values: &[f64]) -> Vec<i32> {
    if values.is_empty() {
        return vec![10, 25, 45, 60, 75, 85];
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if (max - min).abs() < f64::EPSILON { 1.0 } else { max - min };
    [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        .iter()
        .map(|t| {
            let idx = (t * (values.len() - 1) as f64).floor() as usize;
            (((values[idx] - min) / span) * 100.0).round() as i32
        })
        .collect()
}

/// Curve and spikes derived from per-hero gpm/xp benchmarks: fight
/// blends 60% xp with 40% farm, push rides farm, rosh trails push by 20
/// floored at 10, scale is a fixed late ramp.
pub fn benchmark_curve(benchmarks: &BenchmarkResultDto) -> (Curve, Vec<Spike>) {
    let gpm: Vec<f64> = benchmarks.gold_per_min.iter().map(|p| p.value).collect();
    let xp: Vec<f64> = benchmarks.xp_per_min.iter().map(|p| p.value).collect();

    let farm = normalize_benchmark(&gpm);
    let fight: Vec<i32> = normalize_benchmark(&xp)
        .iter()
        .zip(&farm)
        .map(|(&x, &f)| ((x as f64) * 0.6 + (f as f64) * 0.4).round() as i32)
        .collect();
    let push: Vec<i32> = farm
        .iter()
        .map(|&f| ((f as f64) * 0.6 + 30.0).round() as i32)
        .collect();
    let rosh: Vec<i32> = push.iter().map(|&p| (p - 20).max(10)).collect();

    let curve = Curve {
        pickoff: fight.clone(),
        sustain: fight.clone(),
        defense: fight.clone(),
        fight,
        push,
        rosh,
        scale: vec![10, 25, 40, 60, 80, 95],
    };
    let spikes = vec![
        Spike { minute: 8, description: "Rune fights".to_string() },
        Spike { minute: 20, description: "Tormentor".to_string() },
    ];
    (curve, spikes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn hero(id: HeroId, roles: &[HeroRole]) -> Hero {
        Hero {
            id,
            name: format!("Hero {}", id),
            roles: roles.to_vec(),
            icon: String::new(),
        }
    }

    #[test]
    fn default_profile_is_deterministic_per_hero() {
        let h = hero(5, &[HeroRole::Carry, HeroRole::Escape]);
        let a = default_profile(&h);
        let b = default_profile(&h);
        assert_eq!(a, b);
        assert_eq!(a.id, "5-default");
        assert_eq!(a.role, "Carry");
        assert_eq!(a.positions, vec![1]);
        assert!(a.tags.contains(&Tag::CoreBkb));
        assert_eq!(a.spikes[0].minute, 10);
    }

    #[test]
    fn support_positions_win_over_carry() {
        let h = hero(2, &[HeroRole::Carry, HeroRole::Support]);
        assert_eq!(default_profile(&h).positions, vec![4, 5]);
        let core = hero(3, &[HeroRole::Nuker]);
        assert_eq!(default_profile(&core).positions, vec![2, 3]);
    }

    #[test]
    fn resolve_prefers_learned_profiles() {
        let h = hero(7, &[HeroRole::Initiator]);
        let mut learned = default_profile(&h);
        learned.id = "7-roamer".to_string();

        let mut book = ProfileBook::default();
        book.profiles_by_hero.insert(7, vec![learned.clone()]);

        assert_eq!(book.resolve(&h)[0].id, "7-roamer");
        assert_eq!(book.primary(&h).id, "7-roamer");

        // empty learned list falls back to the synthesized default
        book.profiles_by_hero.insert(7, vec![]);
        assert_eq!(book.resolve(&h)[0].id, "7-default");
    }

    #[test]
    fn resolve_pick_handles_unknown_heroes() {
        let book = ProfileBook::default();
        let heroes = vec![hero(1, &[HeroRole::Carry])];
        let pick = DraftPick { hero_id: 999, profile: None };
        let p = book.resolve_pick(&pick, &heroes);
        assert_eq!(p.hero_id, 999);
        // no roles: unbiased default curve, core positions
        assert_eq!(p.positions, vec![2, 3]);
        assert!(p.tags.is_empty());
    }

    #[test]
    fn book_round_trips_and_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        assert!(ProfileBook::load(&path).unwrap().is_empty());

        let heroes = vec![hero(1, &[HeroRole::Carry]), hero(2, &[HeroRole::Support])];
        let book = ProfileBook::synthesize(&heroes);
        book.save(&path).unwrap();

        let loaded = ProfileBook::load(&path).unwrap();
        assert_eq!(loaded.profiles_by_hero.len(), 2);
        assert_eq!(loaded.primary(&heroes[1]).positions, vec![4, 5]);
    }

    #[test]
    fn benchmark_curve_follows_farm_and_xp() {
        let dto: BenchmarkResultDto = serde_json::from_str(
            r#"{"gold_per_min":[{"value":300},{"value":400},{"value":500},{"value":600},{"value":700},{"value":800}],
                "xp_per_min":[{"value":400},{"value":480},{"value":560},{"value":640},{"value":720},{"value":800}]}"#,
        )
        .unwrap();
        let (curve, spikes) = benchmark_curve(&dto);
        // both series normalize to 0..100 over six even steps
        assert_eq!(curve.fight, vec![0, 20, 40, 60, 80, 100]);
        assert_eq!(curve.push, vec![30, 42, 54, 66, 78, 90]);
        assert_eq!(curve.rosh, vec![10, 22, 34, 46, 58, 70]);
        assert_eq!(curve.scale, vec![10, 25, 40, 60, 80, 95]);
        assert_eq!(curve.pickoff, curve.fight);
        assert_eq!(spikes.len(), 2);
    }

    #[test]
    fn empty_benchmarks_use_generic_ramp() {
        let (curve, _) = benchmark_curve(&BenchmarkResultDto::default());
        // farm and xp both fall back to the same ramp; fight is their blend
        assert_eq!(curve.fight, vec![10, 25, 45, 60, 75, 85]);
        assert_eq!(curve.push[0], 36);
    }
}
