use crate::matrix::builder::HeroId;
use crate::matrix::snapshot::MatrixSnapshot;
use crate::matrix::topk::TopKEntry;
use serde::Serialize;
use std::collections::BTreeSet;

/// How many contributor entries each side of an explanation keeps.
pub const CONTRIB_LIMIT: usize = 3;

fn sum_scores(entries: &[TopKEntry], ids: &BTreeSet<HeroId>) -> i64 {
    entries
        .iter()
        .filter(|e| ids.contains(&e.id))
        .map(|e| e.score)
        .sum()
}

fn row<'a>(matrix: &'a MatrixSnapshot, hero: HeroId, allies: bool) -> &'a [TopKEntry] {
    let map = if allies { &matrix.top_allies } else { &matrix.top_opponents };
    map.get(&hero).map(Vec::as_slice).unwrap_or(&[])
}

/// Matrix context for a hypothetical pick: synergy with the picked
/// allies minus opposition from the picked enemies. Scores come from
/// the top-K lists only, so partners outside a hero's list contribute
/// nothing. Without a snapshot the context is zero.
pub fn context_score_for(
    hero: HeroId,
    ally_ids: &[HeroId],
    enemy_ids: &[HeroId],
    matrix: Option<&MatrixSnapshot>,
) -> i64 {
    let Some(matrix) = matrix else { return 0 };
    let allies: BTreeSet<HeroId> = ally_ids.iter().copied().collect();
    let enemies: BTreeSet<HeroId> = enemy_ids.iter().copied().collect();
    sum_scores(row(matrix, hero, true), &allies) - sum_scores(row(matrix, hero, false), &enemies)
}

/// Context the enemy team would gain if they picked the hero. Sides
/// invert: the hero's allies are their picks and its opponents are
/// ours.
pub fn enemy_gain_if_they_pick(
    hero: HeroId,
    ally_ids: &[HeroId],
    enemy_ids: &[HeroId],
    matrix: Option<&MatrixSnapshot>,
) -> i64 {
    context_score_for(hero, enemy_ids, ally_ids, matrix)
}

/// The drafted heroes that drive a candidate's context score, for
/// explanations next to the raw number.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextContrib {
    pub allies: Vec<TopKEntry>,
    pub enemies: Vec<TopKEntry>,
}

pub fn context_contrib_for(
    hero: HeroId,
    ally_ids: &[HeroId],
    enemy_ids: &[HeroId],
    matrix: Option<&MatrixSnapshot>,
) -> ContextContrib {
    let Some(matrix) = matrix else { return ContextContrib::default() };
    let pick = |entries: &[TopKEntry], ids: &[HeroId]| -> Vec<TopKEntry> {
        let set: BTreeSet<HeroId> = ids.iter().copied().collect();
        let mut hits: Vec<TopKEntry> = entries
            .iter()
            .filter(|e| set.contains(&e.id))
            .copied()
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        hits.truncate(CONTRIB_LIMIT);
        hits
    };
    ContextContrib {
        allies: pick(row(matrix, hero, true), ally_ids),
        enemies: pick(row(matrix, hero, false), enemy_ids),
    }
}
