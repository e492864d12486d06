use crate::advisor::curve::axis_mix;
use crate::advisor::profile::ProfileBook;
use crate::api::models::Hero;
use crate::matrix::builder::HeroId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const EARLY_MINUTE: u32 = 15;
const MID_MINUTE: u32 = 25;

#[derive(Debug, Clone, Serialize)]
pub struct MetaEntry {
    pub hero_id: HeroId,
    pub profile_id: String,
    pub role: u8,
    pub score: i64,
}

/// position (1-5) -> descending ranked entries
pub type MetaByRole = BTreeMap<u8, Vec<MetaEntry>>;

/// Role-by-role hero rankings from power curves alone: 60% of the axis
/// mix at minute 15 plus 40% at minute 25, rounded. Profiles land in
/// the bucket of their leading position, so profiles without positions
/// drop out. Each hero keeps only its best profile per role.
///
/// Profiles without curve data rank at zero here rather than borrowing
/// the default curve.
pub fn meta_rankings(heroes: &[Hero], book: &ProfileBook) -> MetaByRole {
    let mut by_role: MetaByRole = (1..=5).map(|r| (r, Vec::new())).collect();
    for hero in heroes {
        for p in book.resolve(hero) {
            let mix =
                axis_mix(&p.curve, EARLY_MINUTE) * 0.6 + axis_mix(&p.curve, MID_MINUTE) * 0.4;
            let role = p.positions.first().copied().unwrap_or(0);
            if let Some(bucket) = by_role.get_mut(&role) {
                bucket.push(MetaEntry {
                    hero_id: hero.id,
                    profile_id: p.id,
                    role,
                    score: mix.round() as i64,
                });
            }
        }
    }
    for bucket in by_role.values_mut() {
        // stable sort: equal scores stay in roster order
        bucket.sort_by(|a, b| b.score.cmp(&a.score));
        let mut seen = BTreeSet::new();
        bucket.retain(|e| seen.insert(e.hero_id));
    }
    by_role
}
