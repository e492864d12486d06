mod advisor;
mod api;
mod cache;
mod config;
mod display;
mod draft;
mod error;
mod matrix;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use advisor::meta::meta_rankings;
use advisor::profile::{benchmark_curve, ProfileBook};
use advisor::scoring::advise;
use advisor::story::storyboard;
use anyhow::Context;
use api::client::OpenDotaClient;
use api::models::Hero;
use cache::{load_or_fetch_heroes, HERO_CACHE_MAX_AGE_MINS};
use clap::{Parser, Subcommand};
use config::Config;
use display::output::{
    display_advice, display_error, display_info, display_matrix_rows, display_meta,
    display_sequence, display_story, display_success, display_sync_report, display_warning,
};
use draft::{cm_sequence, draft_from_match, parse_match_query, DraftState, TeamSide};
use error::AppError;
use indicatif::ProgressBar;
use matrix::snapshot::SnapshotStore;
use matrix::sync::{run_sync, PairStrategy, SyncOptions};
use matrix::topk::{clamp_k, TopKEntry};

#[derive(Parser, Debug)]
#[command(name = "dota_advisor")]
#[command(about = "Draft advisor: matchup matrices, pick/ban suggestions, timing storyboards", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the matchup matrices and write a fresh snapshot
    Sync {
        /// Process at most N heroes (0 = whole roster)
        #[arg(long, default_value = "0")]
        limit: usize,

        /// Top-K entries kept per hero
        #[arg(long, default_value = "50")]
        k: usize,

        /// Explorer lookback window in days
        #[arg(long, default_value = "30")]
        days: u32,

        /// Pro-match pages for the fallback pair source
        #[arg(long, default_value = "25")]
        pages: u32,
    },

    /// Pick and ban suggestions for a draft file
    Suggest {
        /// Draft state JSON file
        draft: PathBuf,

        /// Override the draft minute
        #[arg(short, long)]
        minute: Option<u32>,

        /// Print the JSON payload instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Timing storyboard for a draft file
    Story {
        /// Draft state JSON file
        draft: PathBuf,

        /// Override the draft minute
        #[arg(short, long)]
        minute: Option<u32>,

        /// Print the JSON payload instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Top allies and opponents for one hero from the snapshot
    Matrix {
        /// Hero id
        hero: i32,

        /// Entries shown per list
        #[arg(long, default_value = "10")]
        k: usize,
    },

    /// Role-by-role hero rankings from power curves
    Meta {
        /// Only this position (1-5)
        #[arg(long)]
        role: Option<u8>,

        /// Entries shown per position
        #[arg(long, default_value = "10")]
        top: usize,

        /// Print the JSON payload instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Captains Mode ban/pick order
    Sequence {
        /// Side with first pick (team1 or team2)
        #[arg(long, default_value = "team1")]
        first_pick: String,

        /// Print the JSON payload instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Build a draft file from a finished match id or URL
    Import {
        /// Match id, or any URL containing one
        query: String,

        /// Output path (default: draft-<id>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write a synthesized profile book for the roster
    Presets {
        /// Refine curves from per-hero benchmarks
        #[arg(long)]
        enrich: bool,

        /// Overwrite an existing profile book
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    match args.command {
        Command::Sync { limit, k, days, pages } => cmd_sync(&config, limit, k, days, pages),
        Command::Suggest { draft, minute, json } => cmd_suggest(&config, &draft, minute, json),
        Command::Story { draft, minute, json } => cmd_story(&config, &draft, minute, json),
        Command::Matrix { hero, k } => cmd_matrix(&config, hero, k),
        Command::Meta { role, top, json } => cmd_meta(&config, role, top, json),
        Command::Sequence { first_pick, json } => cmd_sequence(&first_pick, json),
        Command::Import { query, out } => cmd_import(&config, &query, out),
        Command::Presets { enrich, force } => cmd_presets(&config, enrich, force),
    }
}

fn load_draft(path: &Path, minute: Option<u32>) -> anyhow::Result<DraftState> {
    let mut draft = DraftState::load(path)
        .with_context(|| format!("loading draft file {}", path.display()))?;
    if let Some(minute) = minute {
        draft.minute = minute;
    }
    Ok(draft)
}

fn roster(config: &Config, client: &OpenDotaClient) -> anyhow::Result<Vec<Hero>> {
    let heroes = load_or_fetch_heroes(client, &config.heroes_cache_file(), HERO_CACHE_MAX_AGE_MINS)
        .context("loading hero roster")?;
    Ok(heroes)
}

fn profile_book(config: &Config) -> anyhow::Result<ProfileBook> {
    let path = config.profiles_file();
    let book =
        ProfileBook::load(&path).with_context(|| format!("loading profile book {}", path.display()))?;
    Ok(book)
}

fn cmd_sync(config: &Config, limit: usize, k: usize, days: u32, pages: u32) -> anyhow::Result<()> {
    let client = OpenDotaClient::new(config.clone());
    let strategy = if config.use_explorer {
        PairStrategy::Explorer { days }
    } else {
        PairStrategy::ProMatches { pages }
    };
    let options = SyncOptions { limit, k: clamp_k(k), strategy };

    display_info(&format!(
        "Syncing matrices from OpenDota ({})",
        options.strategy.label()
    ));
    let report = run_sync(&client, config, &options)?;
    display_sync_report(&report);
    Ok(())
}

fn cmd_suggest(config: &Config, path: &Path, minute: Option<u32>, json: bool) -> anyhow::Result<()> {
    let draft = load_draft(path, minute)?;
    let client = OpenDotaClient::new(config.clone());
    let heroes = roster(config, &client)?;
    let book = profile_book(config)?;

    let store = SnapshotStore::new(config.snapshot_file.clone());
    let snapshot = store.try_get();
    if snapshot.is_none() {
        display_warning("Matrix snapshot not loaded; suggestions run without draft context");
    }

    let advice = advise(&heroes, &book, &draft, snapshot.as_deref(), config.ctx_weight)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
    } else {
        display_advice(&advice, &heroes);
    }
    Ok(())
}

fn cmd_story(config: &Config, path: &Path, minute: Option<u32>, json: bool) -> anyhow::Result<()> {
    let draft = load_draft(path, minute)?;
    let client = OpenDotaClient::new(config.clone());
    let heroes = roster(config, &client)?;
    let book = profile_book(config)?;

    let story = storyboard(&heroes, &book, &draft);

    if json {
        println!("{}", serde_json::to_string_pretty(&story)?);
    } else {
        display_story(&story);
    }
    Ok(())
}

fn cmd_matrix(config: &Config, hero_id: i32, k: usize) -> anyhow::Result<()> {
    let store = SnapshotStore::new(config.snapshot_file.clone());
    let snapshot = store.get()?;

    let client = OpenDotaClient::new(config.clone());
    let heroes = roster(config, &client)?;
    let hero = heroes
        .iter()
        .find(|h| h.id == hero_id)
        .ok_or(AppError::UnknownHero(hero_id))?;

    let k = clamp_k(k);
    let empty: Vec<TopKEntry> = Vec::new();
    let allies = snapshot.top_allies.get(&hero_id).unwrap_or(&empty);
    let opponents = snapshot.top_opponents.get(&hero_id).unwrap_or(&empty);
    display_matrix_rows(
        hero,
        &allies[..k.min(allies.len())],
        &opponents[..k.min(opponents.len())],
        &heroes,
    );
    Ok(())
}

fn cmd_meta(config: &Config, role: Option<u8>, top: usize, json: bool) -> anyhow::Result<()> {
    let client = OpenDotaClient::new(config.clone());
    let heroes = roster(config, &client)?;
    let book = profile_book(config)?;

    let mut meta = meta_rankings(&heroes, &book);
    if let Some(role) = role {
        meta.retain(|r, _| *r == role);
        if meta.is_empty() {
            return Err(AppError::MalformedInput(format!(
                "position {} outside the 1-5 range",
                role
            ))
            .into());
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "meta": meta }))?
        );
    } else {
        display_meta(&meta, &heroes, top);
    }
    Ok(())
}

fn cmd_sequence(first_pick: &str, json: bool) -> anyhow::Result<()> {
    let side = TeamSide::from_str(first_pick).map_err(|_| {
        AppError::MalformedInput(format!(
            "first pick must be team1 or team2, got: {}",
            first_pick
        ))
    })?;
    let steps = cm_sequence(side);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "sequence": steps }))?
        );
    } else {
        display_sequence(&steps);
    }
    Ok(())
}

fn cmd_import(config: &Config, query: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let match_id = parse_match_query(query)
        .ok_or_else(|| AppError::MalformedInput(format!("no match id in: {}", query)))?;

    let client = OpenDotaClient::new(config.clone());
    display_info(&format!("Fetching match {}", match_id));
    let details = client.match_details(match_id)?;
    let imported = draft_from_match(match_id, &details);
    if imported.picks.is_empty() {
        return Err(
            AppError::MalformedInput(format!("match {} exposes no picks", match_id)).into(),
        );
    }

    let draft = imported.to_draft_state();
    let path = out.unwrap_or_else(|| PathBuf::from(format!("draft-{}.json", match_id)));
    fs::write(&path, serde_json::to_string_pretty(&draft)?)
        .with_context(|| format!("writing {}", path.display()))?;

    display_success(&format!(
        "{} vs {}: {} picks -> {}",
        imported.radiant,
        imported.dire,
        imported.picks.len(),
        path.display()
    ));
    Ok(())
}

fn cmd_presets(config: &Config, enrich: bool, force: bool) -> anyhow::Result<()> {
    let path = config.profiles_file();
    if path.exists() && !force {
        return Err(AppError::ConfigError(format!(
            "{} already exists; rerun with --force to overwrite",
            path.display()
        ))
        .into());
    }

    let client = OpenDotaClient::new(config.clone());
    let heroes = roster(config, &client)?;
    let mut book = ProfileBook::synthesize(&heroes);

    if enrich {
        let bar = ProgressBar::new(heroes.len() as u64);
        bar.set_message("Fetching benchmarks");
        for hero in &heroes {
            match client.benchmarks(hero.id) {
                Ok(benchmarks) => {
                    let (curve, spikes) = benchmark_curve(&benchmarks);
                    if let Some(profiles) = book.profiles_by_hero.get_mut(&hero.id) {
                        for profile in profiles {
                            profile.curve = curve.clone();
                            profile.spikes = spikes.clone();
                        }
                    }
                }
                Err(e) => {
                    display_warning(&format!("benchmarks for hero {} skipped: {}", hero.id, e))
                }
            }
            bar.inc(1);
        }
        bar.finish_with_message("✓ Benchmarks fetched");
    }

    book.save(&path)?;
    display_success(&format!(
        "Profile book for {} heroes written to {}",
        book.profiles_by_hero.len(),
        path.display()
    ));
    Ok(())
}
