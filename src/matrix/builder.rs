use crate::api::models::{ExplorerRowDto, Hero, MatchupDto, ProMatchDto};
use crate::matrix::smoothing::{eb_smooth, pair_score, Formula, KindParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type HeroId = i32;

/// Undirected ally-pair aggregate: games the two heroes played on the
/// same side and how many of those they won.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AllyPair {
    pub a: HeroId,
    pub b: HeroId,
    pub games: u32,
    pub wins: u32,
}

impl From<ExplorerRowDto> for AllyPair {
    fn from(row: ExplorerRowDto) -> Self {
        AllyPair {
            a: row.a,
            b: row.b,
            games: row.games,
            wins: row.wins,
        }
    }
}

/// Directed opponent aggregate for one hero, as the provider reports it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsRaw {
    pub vs_hero_id: HeroId,
    pub games: u32,
    pub wins: u32,
}

impl From<MatchupDto> for VsRaw {
    fn from(dto: MatchupDto) -> Self {
        VsRaw {
            vs_hero_id: dto.hero_id,
            games: dto.games_played,
            wins: dto.wins,
        }
    }
}

/// Per-hero directed opponent aggregates keyed by the hero the row
/// belongs to.
pub type VsRawMap = BTreeMap<HeroId, Vec<VsRaw>>;

/// One matrix cell, recomputed wholesale on every sync.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatrixCell {
    pub games: u32,
    pub wr: f64,
    pub lift: f64,
    pub score: f64,
}

/// hero -> partner/opponent -> cell. Every roster hero has an outer row,
/// possibly empty.
pub type Matrix = BTreeMap<HeroId, BTreeMap<HeroId, MatrixCell>>;

fn cell(games: u32, wins: u32, baseline: f64, params: &KindParams) -> MatrixCell {
    let wr = eb_smooth(wins, games, params.prior, params.alpha);
    let lift = wr - baseline;
    MatrixCell {
        games,
        wr,
        lift,
        score: pair_score(lift, games, params),
    }
}

/// Ally (WITH) matrix from undirected pair rows.
///
/// One smoothed win rate per pair, but lift and score are computed per
/// side against each side's own baseline, so the same pairing scores
/// differently for a strong hero than for a weak one. Rows with either
/// endpoint outside the roster are skipped; baselines accumulate only
/// kept rows.
pub fn build_with_matrix(heroes: &[Hero], rows: &[AllyPair], formula: &Formula) -> Matrix {
    let params = &formula.with;
    let roster: std::collections::BTreeSet<HeroId> = heroes.iter().map(|h| h.id).collect();
    let kept: Vec<&AllyPair> = rows
        .iter()
        .filter(|r| roster.contains(&r.a) && roster.contains(&r.b))
        .collect();

    // baseline per hero = raw win rate across all recorded partnerships
    let mut wins_total: BTreeMap<HeroId, u32> = BTreeMap::new();
    let mut games_total: BTreeMap<HeroId, u32> = BTreeMap::new();
    for r in &kept {
        for id in [r.a, r.b] {
            *wins_total.entry(id).or_default() += r.wins;
            *games_total.entry(id).or_default() += r.games;
        }
    }
    let baseline = |id: HeroId| -> f64 {
        let g = games_total.get(&id).copied().unwrap_or(0);
        if g > 0 {
            wins_total[&id] as f64 / g as f64
        } else {
            params.prior
        }
    };

    let mut matrix: Matrix = heroes.iter().map(|h| (h.id, BTreeMap::new())).collect();
    for r in kept {
        let cell_a = cell(r.games, r.wins, baseline(r.a), params);
        let cell_b = cell(r.games, r.wins, baseline(r.b), params);
        if let Some(row) = matrix.get_mut(&r.a) {
            row.insert(r.b, cell_a);
        }
        if let Some(row) = matrix.get_mut(&r.b) {
            row.insert(r.a, cell_b);
        }
    }
    matrix
}

/// Opponent (VS) matrix from per-hero directed aggregates.
///
/// Baseline per hero is its raw win rate against the whole opponent
/// field, or the prior when the hero has no recorded games.
pub fn build_vs_matrix(heroes: &[Hero], raw: &VsRawMap, formula: &Formula) -> Matrix {
    let params = &formula.vs;
    let empty: Vec<VsRaw> = Vec::new();

    let mut matrix: Matrix = Matrix::new();
    for hero in heroes {
        let rows = raw.get(&hero.id).unwrap_or(&empty);
        let games: u32 = rows.iter().map(|r| r.games).sum();
        let wins: u32 = rows.iter().map(|r| r.wins).sum();
        let baseline = if games > 0 {
            wins as f64 / games as f64
        } else {
            params.prior
        };

        let row: BTreeMap<HeroId, MatrixCell> = rows
            .iter()
            .map(|r| (r.vs_hero_id, cell(r.games, r.wins, baseline, params)))
            .collect();
        matrix.insert(hero.id, row);
    }
    matrix
}

/// Derive undirected ally pairs from batches of recorded matches. Only
/// sides with a full five heroes contribute; pairs are keyed with the
/// smaller id first.
pub fn aggregate_ally_pairs(matches: &[ProMatchDto]) -> Vec<AllyPair> {
    let mut map: BTreeMap<(HeroId, HeroId), (u32, u32)> = BTreeMap::new();
    let mut add_side = |side: &[HeroId], won: bool| {
        if side.len() != 5 {
            return;
        }
        for i in 0..side.len() {
            for j in (i + 1)..side.len() {
                let key = (side[i].min(side[j]), side[i].max(side[j]));
                let entry = map.entry(key).or_default();
                entry.0 += 1;
                if won {
                    entry.1 += 1;
                }
            }
        }
    };
    for m in matches {
        add_side(&m.radiant_heroes(), m.radiant_win);
        add_side(&m.dire_heroes(), !m.radiant_win);
    }
    map.into_iter()
        .map(|((a, b), (games, wins))| AllyPair { a, b, games, wins })
        .collect()
}
