use crate::advisor::curve::{Axis, AxisDeltas};
use crate::advisor::tags::Tag;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

/// Aura saturation schedule. Team-wide buffs do not stack linearly, so
/// each additional aura past the first is worth a shrinking fraction of
/// its listed effect, indexed by how many auras the team already
/// committed.
const AURA_WEIGHTS: [f64; 4] = [1.0, 0.4, 0.15, 0.0];

/// Effect weight for the next aura given the team's committed count.
pub fn aura_saturation(prior_auras: usize) -> f64 {
    AURA_WEIGHTS[prior_auras.min(3)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemKey {
    Blink,
    Bkb,
    ArcaneBoots,
    Mekansm,
    Greaves,
    Pipe,
    CrimsonGuard,
    Vladmir,
    Assault,
    ShivasGuard,
    Radiance,
    AghanimScepter,
    AghanimShard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    Mobility,
    Core,
    Economy,
    Aura,
    AuraMagic,
    AuraPhysical,
    HeroSpecific,
}

impl ItemClass {
    /// Aura-class items count against the team saturation schedule.
    pub fn is_aura(self) -> bool {
        matches!(self, ItemClass::Aura | ItemClass::AuraMagic | ItemClass::AuraPhysical)
    }
}

/// Static item reference entry.
pub struct ItemSpec {
    pub key: ItemKey,
    pub label: &'static str,
    pub effects: &'static [(Axis, i32)],
    pub class: ItemClass,
}

pub const ITEMS: [ItemSpec; 13] = [
    ItemSpec {
        key: ItemKey::Blink,
        label: "Blink",
        effects: &[(Axis::Pickoff, 18), (Axis::Fight, 10)],
        class: ItemClass::Mobility,
    },
    ItemSpec {
        key: ItemKey::Bkb,
        label: "BKB",
        effects: &[(Axis::Fight, 15), (Axis::Push, 6)],
        class: ItemClass::Core,
    },
    ItemSpec {
        key: ItemKey::ArcaneBoots,
        label: "Arcanes",
        effects: &[(Axis::Sustain, 6)],
        class: ItemClass::Economy,
    },
    ItemSpec {
        key: ItemKey::Mekansm,
        label: "Mek",
        effects: &[(Axis::Sustain, 10), (Axis::Defense, 8)],
        class: ItemClass::Aura,
    },
    ItemSpec {
        key: ItemKey::Greaves,
        label: "Greaves",
        effects: &[(Axis::Sustain, 20), (Axis::Defense, 15), (Axis::Push, 6)],
        class: ItemClass::Aura,
    },
    ItemSpec {
        key: ItemKey::Pipe,
        label: "Pipe",
        effects: &[(Axis::Defense, 18)],
        class: ItemClass::AuraMagic,
    },
    ItemSpec {
        key: ItemKey::CrimsonGuard,
        label: "Crimson",
        effects: &[(Axis::Defense, 14)],
        class: ItemClass::AuraPhysical,
    },
    ItemSpec {
        key: ItemKey::Vladmir,
        label: "Vlad",
        effects: &[(Axis::Push, 10), (Axis::Rosh, 6)],
        class: ItemClass::Aura,
    },
    ItemSpec {
        key: ItemKey::Assault,
        label: "AC",
        effects: &[(Axis::TowerDamage, 18), (Axis::Push, 10), (Axis::Rosh, 8), (Axis::Defense, 6)],
        class: ItemClass::Aura,
    },
    ItemSpec {
        key: ItemKey::ShivasGuard,
        label: "Shiva",
        effects: &[(Axis::Defense, 12), (Axis::Fight, 8), (Axis::AntiHeal, 1)],
        class: ItemClass::Core,
    },
    ItemSpec {
        key: ItemKey::Radiance,
        label: "Radiance",
        effects: &[(Axis::Scale, 8)],
        class: ItemClass::Core,
    },
    ItemSpec {
        key: ItemKey::AghanimScepter,
        label: "Aghs",
        effects: &[(Axis::Fight, 8), (Axis::Pickoff, 8)],
        class: ItemClass::HeroSpecific,
    },
    ItemSpec {
        key: ItemKey::AghanimShard,
        label: "Shard",
        effects: &[(Axis::Pickoff, 6), (Axis::Fight, 4)],
        class: ItemClass::HeroSpecific,
    },
];

fn spec(key: ItemKey) -> &'static ItemSpec {
    // ITEMS covers every ItemKey variant
    ITEMS
        .iter()
        .find(|s| s.key == key)
        .unwrap_or(&ITEMS[0])
}

/// Estimated acquisition minute. A few purchases shift with the buyer's
/// position; everything else is a flat table value.
pub fn est_item_minute(key: ItemKey, role_hint: u8) -> u32 {
    match key {
        ItemKey::Blink => {
            if role_hint == 3 || role_hint == 2 {
                12
            } else {
                14
            }
        }
        ItemKey::Bkb => {
            if role_hint == 1 || role_hint == 2 {
                18
            } else {
                20
            }
        }
        ItemKey::Greaves => {
            if role_hint >= 4 {
                17
            } else {
                19
            }
        }
        ItemKey::Pipe => 17,
        ItemKey::CrimsonGuard => 18,
        ItemKey::Vladmir => 12,
        ItemKey::Assault => 20,
        ItemKey::ShivasGuard => 22,
        ItemKey::Radiance => 20,
        ItemKey::AghanimScepter => 20,
        ItemKey::AghanimShard => 15,
        ItemKey::Mekansm => 14,
        ItemKey::ArcaneBoots => 8,
    }
}

/// An item a drafted profile is expected to buy, with its estimated
/// timing and axis effects resolved.
#[derive(Debug, Clone, Serialize)]
pub struct LikelyItem {
    pub key: ItemKey,
    pub label: String,
    pub minute: u32,
    pub effects: BTreeMap<Axis, i32>,
    pub aura: bool,
}

/// Likely purchases for a profile, ordered by estimated minute (table
/// order for equal minutes). The anti-heal Shiva's pick only applies on
/// the ally path; deny scoring skips it.
pub fn likely_items(tags: &BTreeSet<Tag>, role_hint: u8, include_anti_heal: bool) -> Vec<LikelyItem> {
    let mut keys = Vec::new();
    if tags.contains(&Tag::Initiator) {
        keys.push(ItemKey::Blink);
    }
    if tags.contains(&Tag::AuraCarrier) {
        keys.push(ItemKey::Greaves);
    }
    if tags.contains(&Tag::PipeAura) {
        keys.push(ItemKey::Pipe);
    }
    if tags.contains(&Tag::ArmorAura) {
        keys.push(ItemKey::Assault);
    }
    if include_anti_heal && tags.contains(&Tag::AntiHeal) {
        keys.push(ItemKey::ShivasGuard);
    }
    if tags.contains(&Tag::CoreBkb) || role_hint <= 2 {
        keys.push(ItemKey::Bkb);
    }

    let mut items: Vec<LikelyItem> = keys
        .into_iter()
        .map(|key| {
            let s = spec(key);
            LikelyItem {
                key,
                label: s.label.to_string(),
                minute: est_item_minute(key, role_hint),
                effects: s.effects.iter().copied().collect(),
                aura: s.class.is_aura(),
            }
        })
        .collect();
    items.sort_by_key(|item| item.minute);
    items
}

/// Add an item's axis effects to a running accumulator at the given
/// weight.
pub fn apply_item_effects(axes: &mut AxisDeltas, effects: &BTreeMap<Axis, i32>, weight: f64) {
    for (&axis, &delta) in effects {
        *axes.entry(axis).or_insert(0.0) += delta as f64 * weight;
    }
}

/// Apply every item acquired by `minute` to the accumulator, walking in
/// minute order and advancing the team aura count as aura items land.
/// Returns the updated aura count.
pub fn apply_items_until(
    axes: &mut AxisDeltas,
    items: &[LikelyItem],
    minute: u32,
    mut aura_count: usize,
) -> usize {
    for item in items {
        if item.minute <= minute {
            let weight = if item.aura {
                aura_saturation(aura_count)
            } else {
                1.0
            };
            apply_item_effects(axes, &item.effects, weight);
            if item.aura {
                aura_count += 1;
            }
        }
    }
    aura_count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_set(tags: &[Tag]) -> BTreeSet<Tag> {
        tags.iter().cloned().collect()
    }

    #[test]
    fn aura_weights_follow_saturation_schedule() {
        assert_eq!(aura_saturation(0), 1.0);
        assert_eq!(aura_saturation(1), 0.4);
        assert_eq!(aura_saturation(2), 0.15);
        assert_eq!(aura_saturation(3), 0.0);
        assert_eq!(aura_saturation(7), 0.0);
    }

    #[test]
    fn role_adjusts_blink_and_bkb_timings() {
        assert_eq!(est_item_minute(ItemKey::Blink, 2), 12);
        assert_eq!(est_item_minute(ItemKey::Blink, 5), 14);
        assert_eq!(est_item_minute(ItemKey::Bkb, 1), 18);
        assert_eq!(est_item_minute(ItemKey::Bkb, 4), 20);
        assert_eq!(est_item_minute(ItemKey::Greaves, 5), 17);
        assert_eq!(est_item_minute(ItemKey::Greaves, 2), 19);
    }

    #[test]
    fn likely_items_come_out_in_minute_order() {
        // pos-4 initiator aura carrier: greaves@17, blink@14; no bkb
        let items = likely_items(&tag_set(&[Tag::Initiator, Tag::AuraCarrier]), 4, true);
        let keys: Vec<ItemKey> = items.iter().map(|i| i.key).collect();
        assert_eq!(keys, vec![ItemKey::Blink, ItemKey::Greaves]);
        assert!(items[0].minute <= items[1].minute);
    }

    #[test]
    fn core_positions_expect_bkb_without_the_tag() {
        let items = likely_items(&tag_set(&[]), 2, true);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, ItemKey::Bkb);
        assert!(!items[0].aura);

        let none = likely_items(&tag_set(&[]), 4, true);
        assert!(none.is_empty());
    }

    #[test]
    fn anti_heal_pick_is_ally_path_only() {
        let tags = tag_set(&[Tag::AntiHeal]);
        let ally = likely_items(&tags, 4, true);
        assert!(ally.iter().any(|i| i.key == ItemKey::ShivasGuard));
        let deny = likely_items(&tags, 4, false);
        assert!(deny.iter().all(|i| i.key != ItemKey::ShivasGuard));
    }

    #[test]
    fn stacked_auras_diminish_with_committed_count() {
        // team already committed one aura; two new aura items land at
        // 40% and 15% of listed effect
        let tags = tag_set(&[Tag::AuraCarrier, Tag::PipeAura]);
        let items = likely_items(&tags, 5, true);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.aura));

        let mut axes = AxisDeltas::new();
        let count = apply_items_until(&mut axes, &items, 60, 1);
        assert_eq!(count, 3);
        // greaves@17 first (defense +15 at 0.4), pipe@17... order: both
        // minute 17, table order keeps greaves first
        let defense = axes[&Axis::Defense];
        assert!((defense - (15.0 * 0.4 + 18.0 * 0.15)).abs() < 1e-9);
    }

    #[test]
    fn items_past_the_minute_are_not_applied() {
        let items = likely_items(&tag_set(&[Tag::CoreBkb]), 1, true);
        let mut axes = AxisDeltas::new();
        apply_items_until(&mut axes, &items, 10, 0);
        assert!(axes.is_empty());
        apply_items_until(&mut axes, &items, 18, 0);
        assert_eq!(axes[&Axis::Fight], 15.0);
    }
}
