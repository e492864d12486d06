use crate::api::client::OpenDotaClient;
use crate::api::models::Hero;
use crate::cache::HeroCache;
use crate::config::Config;
use crate::display::output::display_warning;
use crate::error::AppError;
use crate::matrix::builder::{
    aggregate_ally_pairs, build_vs_matrix, build_with_matrix, AllyPair, HeroId, VsRaw, VsRawMap,
};
use crate::matrix::smoothing::Formula;
use crate::matrix::snapshot::{save_json_atomic, FullMatrixSnapshot, MatrixSnapshot, RawSnapshot};
use crate::matrix::topk::{build_topk, DEFAULT_K};
use chrono::Utc;
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Where ally-pair rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStrategy {
    /// Server-side SQL aggregation over recent public matches.
    Explorer { days: u32 },
    /// Pair counting over paged pro-match listings.
    ProMatches { pages: u32 },
}

impl PairStrategy {
    /// Source label recorded in the snapshot metadata.
    pub fn label(&self) -> &'static str {
        match self {
            PairStrategy::Explorer { .. } => "opendota:explorer",
            PairStrategy::ProMatches { .. } => "opendota:proMatches",
        }
    }
}

/// Raw statistics provider for a sync run.
pub trait StatsSource {
    fn roster(&self) -> Result<Vec<Hero>, AppError>;
    fn matchups(&self, hero_id: HeroId) -> Result<Vec<VsRaw>, AppError>;
    fn ally_pairs(&self, strategy: &PairStrategy) -> Result<Vec<AllyPair>, AppError>;
}

impl StatsSource for OpenDotaClient {
    fn roster(&self) -> Result<Vec<Hero>, AppError> {
        self.heroes()
    }

    fn matchups(&self, hero_id: HeroId) -> Result<Vec<VsRaw>, AppError> {
        OpenDotaClient::matchups(self, hero_id)
    }

    fn ally_pairs(&self, strategy: &PairStrategy) -> Result<Vec<AllyPair>, AppError> {
        match *strategy {
            PairStrategy::Explorer { days } => self.explorer_pairs(days),
            PairStrategy::ProMatches { pages } => {
                Ok(aggregate_ally_pairs(&self.pro_matches(pages)?))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Process at most this many heroes when positive.
    pub limit: usize,
    pub k: usize,
    pub strategy: PairStrategy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            limit: 0,
            k: DEFAULT_K,
            strategy: PairStrategy::ProMatches { pages: 25 },
        }
    }
}

/// What a sync run produced.
#[derive(Debug)]
pub struct SyncReport {
    pub date: String,
    pub hero_count: usize,
    pub pair_rows: usize,
    pub failed_matchups: usize,
    pub snapshot_file: PathBuf,
    pub source: String,
}

/// Fetch raw statistics, rebuild both matrices, and write the dated
/// snapshots plus the canonical top-K file. A failed matchup fetch for
/// one hero degrades to an empty row and a warning; it never aborts the
/// build for the rest of the roster.
pub fn run_sync<S: StatsSource>(
    source: &S,
    config: &Config,
    options: &SyncOptions,
) -> Result<SyncReport, AppError> {
    let mut heroes = source.roster()?;

    // cache the full roster for later commands, even under --limit
    if let Err(e) = HeroCache::new(heroes.clone()).save(&config.heroes_cache_file()) {
        display_warning(&format!("hero cache not written: {}", e));
    }

    if options.limit > 0 {
        heroes.truncate(options.limit);
    }

    let bar = ProgressBar::new(heroes.len() as u64);
    bar.set_message("Fetching matchups");
    let mut all_vs_raw = VsRawMap::new();
    let mut failed_matchups = 0;
    for hero in &heroes {
        let rows = match source.matchups(hero.id) {
            Ok(rows) => rows,
            Err(e) => {
                display_warning(&format!("matchups for hero {} skipped: {}", hero.id, e));
                failed_matchups += 1;
                Vec::new()
            }
        };
        all_vs_raw.insert(hero.id, rows);
        bar.inc(1);
    }
    bar.finish_with_message("✓ Matchups fetched");

    let pairs = source.ally_pairs(&options.strategy)?;

    let formula = Formula::default();
    let with_matrix = build_with_matrix(&heroes, &pairs, &formula);
    let vs_matrix = build_vs_matrix(&heroes, &all_vs_raw, &formula);
    let top_allies = build_topk(&heroes, &with_matrix, options.k);
    let top_opponents = build_topk(&heroes, &vs_matrix, options.k);

    let date = Utc::now().format("%Y%m%d").to_string();
    let snapshot_dir = config.snapshot_dir();

    save_json_atomic(
        &snapshot_dir.join(format!("open_dota_raw_{}.json", date)),
        &RawSnapshot {
            date: date.clone(),
            heroes: &heroes,
            all_vs_raw: &all_vs_raw,
        },
    )?;
    save_json_atomic(
        &snapshot_dir.join(format!("matrix_{}.json", date)),
        &FullMatrixSnapshot {
            date: date.clone(),
            vs_matrix: &vs_matrix,
            with_matrix: &with_matrix,
            top_allies: &top_allies,
            top_opponents: &top_opponents,
        },
    )?;

    let label = options.strategy.label();
    let snapshot = MatrixSnapshot::new(label, top_allies, top_opponents);
    save_json_atomic(&config.snapshot_file, &snapshot)?;

    Ok(SyncReport {
        date,
        hero_count: heroes.len(),
        pair_rows: pairs.len(),
        failed_matchups,
        snapshot_file: config.snapshot_file.clone(),
        source: label.to_string(),
    })
}
