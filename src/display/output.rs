use crate::advisor::meta::MetaByRole;
use crate::advisor::scoring::Advice;
use crate::advisor::story::Story;
use crate::api::models::Hero;
use crate::draft::{SequenceStep, StepKind, TeamSide};
use crate::matrix::builder::HeroId;
use crate::matrix::sync::SyncReport;
use crate::matrix::topk::TopKEntry;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PickRow {
    rank: String,
    hero: String,
    #[tabled(rename = "as")]
    profile: String,
    reasons: String,
    items: String,
    ctx: String,
    score: String,
}

#[derive(Tabled)]
struct BanRow {
    rank: String,
    hero: String,
    reasons: String,
    #[tabled(rename = "enemy ctx")]
    gain: String,
    score: String,
}

#[derive(Tabled)]
struct MatrixRow {
    rank: String,
    hero: String,
    score: String,
}

#[derive(Tabled)]
struct MetaRow {
    rank: String,
    hero: String,
    profile: String,
    score: String,
}

#[derive(Tabled)]
struct CompositionRow {
    axis: String,
    #[tabled(rename = "team 1")]
    team1: String,
    #[tabled(rename = "team 2")]
    team2: String,
}

#[derive(Tabled)]
struct SeriesRow {
    minute: String,
    #[tabled(rename = "T1 push")]
    t1_push: String,
    #[tabled(rename = "T1 pickoff")]
    t1_pickoff: String,
    #[tabled(rename = "T1 fight")]
    t1_fight: String,
    #[tabled(rename = "T2 push")]
    t2_push: String,
    #[tabled(rename = "T2 pickoff")]
    t2_pickoff: String,
    #[tabled(rename = "T2 fight")]
    t2_fight: String,
}

#[derive(Tabled)]
struct SequenceRow {
    step: String,
    action: String,
    team: String,
}

fn hero_name(heroes: &[Hero], id: HeroId) -> String {
    heroes
        .iter()
        .find(|h| h.id == id)
        .map(|h| h.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

fn name_list(heroes: &[Hero], entries: &[TopKEntry]) -> String {
    entries
        .iter()
        .map(|e| hero_name(heroes, e.id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn team_label(side: TeamSide) -> &'static str {
    match side {
        TeamSide::Team1 => "Team 1",
        TeamSide::Team2 => "Team 2",
    }
}

pub fn display_advice(advice: &Advice, heroes: &[Hero]) {
    println!(
        "\n{}",
        format!("🧠 Draft Suggestions (minute {})", advice.minute)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    let covered: Vec<String> = advice
        .coverage
        .iter()
        .filter(|c| c.ok)
        .map(|c| c.tag.words())
        .collect();
    let missing: Vec<String> = advice
        .coverage
        .iter()
        .filter(|c| !c.ok)
        .map(|c| c.tag.words())
        .collect();
    println!("{} {}", "Covered:".bold(), covered.join(", ").green());
    println!("{} {}", "Missing:".bold(), missing.join(", ").red());
    if !advice.team_needs.is_empty() {
        let needs: Vec<String> = advice.team_needs.iter().map(|t| t.words()).collect();
        println!("{} {}", "Needs next:".bold().yellow(), needs.join(", "));
    }

    println!("\n{}", "Pick Suggestions".bold().green());
    if advice.ally_suggestions.is_empty() {
        println!("{}", "No candidates left in the pool".yellow());
    } else {
        let rows: Vec<PickRow> = advice
            .ally_suggestions
            .iter()
            .enumerate()
            .map(|(idx, s)| PickRow {
                rank: format!("#{}", idx + 1),
                hero: s.name.clone(),
                profile: s.profile.role.clone(),
                reasons: s.reasons.join(", "),
                items: s
                    .items_likely
                    .iter()
                    .map(|i| format!("{} @{}", i.label, i.minute))
                    .collect::<Vec<_>>()
                    .join(", "),
                ctx: format!("{:+}", s.context_score),
                score: format!("{:.2}", s.score),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    println!("\n{}", "Ban Suggestions".bold().red());
    if advice.ban_suggestions.is_empty() {
        println!("{}", "No candidates left in the pool".yellow());
    } else {
        let rows: Vec<BanRow> = advice
            .ban_suggestions
            .iter()
            .enumerate()
            .map(|(idx, s)| BanRow {
                rank: format!("#{}", idx + 1),
                hero: s.name.clone(),
                reasons: s.reasons.join(", "),
                gain: format!("{:+}", s.enemy_context_gain),
                score: format!("{:.2}", s.score),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    if let Some(top) = advice.ally_suggestions.first() {
        println!("\n{}", "Top Pick".bold().green());
        println!("  {} ({})", top.name, top.profile_id);
        let with = name_list(heroes, &top.context_contrib.allies);
        if !with.is_empty() {
            println!("  matrix allies on your side: {}", with);
        }
        let against = name_list(heroes, &top.context_contrib.enemies);
        if !against.is_empty() {
            println!("  matrix opponents on theirs: {}", against);
        }
    }

    println!();
}

pub fn display_story(story: &Story) {
    println!("\n{}", "📖 Timing Storyboard".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let fmt_positions = |p: &[u8]| {
        p.iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!(
        "{} {}   {} {}",
        "Team 1 positions:".bold(),
        fmt_positions(&story.positions.team1),
        "Team 2 positions:".bold(),
        fmt_positions(&story.positions.team2)
    );

    let rows: Vec<CompositionRow> = story
        .composition
        .team1
        .iter()
        .map(|(axis, t1)| CompositionRow {
            axis: axis.to_string().replace('_', " "),
            team1: t1.to_string(),
            team2: story
                .composition
                .team2
                .get(axis)
                .copied()
                .unwrap_or(0)
                .to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{}", table);

    println!("\n{}", "Push Windows".bold().yellow());
    if story.windows.is_empty() {
        println!("• No decisive push windows in the charted range");
    } else {
        for w in &story.windows {
            println!("• {}-{}: {}", w.start, w.end, w.label);
        }
    }

    println!("\n{}", "Lanes".bold().yellow());
    for lane in &story.lanes {
        println!("• {}: {} ({})", lane.lane, lane.label, lane.reasons.join(", "));
    }

    println!("\n{}", "Objective Spikes".bold().yellow());
    for spike in &story.spikes {
        println!("• min {}: {}", spike.minute, spike.label);
    }

    let series = &story.series;
    let rows: Vec<SeriesRow> = series
        .team1
        .push
        .keys()
        .map(|&m| {
            let at = |map: &std::collections::BTreeMap<u32, i64>| {
                map.get(&m).copied().unwrap_or(0).to_string()
            };
            SeriesRow {
                minute: m.to_string(),
                t1_push: at(&series.team1.push),
                t1_pickoff: at(&series.team1.pickoff),
                t1_fight: at(&series.team1.fight),
                t2_push: at(&series.team2.push),
                t2_pickoff: at(&series.team2.pickoff),
                t2_fight: at(&series.team2.fight),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{}", table);
    println!();
}

pub fn display_matrix_rows(
    hero: &Hero,
    allies: &[TopKEntry],
    opponents: &[TopKEntry],
    heroes: &[Hero],
) {
    println!("\n{}", format!("🔢 Matrix: {}", hero.name).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let to_rows = |entries: &[TopKEntry]| -> Vec<MatrixRow> {
        entries
            .iter()
            .enumerate()
            .map(|(idx, e)| MatrixRow {
                rank: format!("#{}", idx + 1),
                hero: hero_name(heroes, e.id),
                score: format!("{:+}", e.score),
            })
            .collect()
    };

    println!("{}", "Top Allies".bold().green());
    if allies.is_empty() {
        println!("{}", "No ally data for this hero".yellow());
    } else {
        let mut table = Table::new(to_rows(allies));
        table.with(Style::rounded());
        println!("{}", table);
    }

    println!("\n{}", "Top Opponents".bold().red());
    if opponents.is_empty() {
        println!("{}", "No opponent data for this hero".yellow());
    } else {
        let mut table = Table::new(to_rows(opponents));
        table.with(Style::rounded());
        println!("{}", table);
    }

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Score rewards win-rate lift over the hero's own baseline plus sample volume");
    println!("• Allies: strongest recorded same-team pairings for this hero");
    println!("• Opponents: matchups where this hero's recorded lift is highest\n");
}

pub fn display_meta(meta: &MetaByRole, heroes: &[Hero], top: usize) {
    println!("\n{}", "📈 Meta Rankings".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    for (role, entries) in meta {
        println!("{}", format!("Position {}", role).bold().yellow());
        if entries.is_empty() {
            println!("{}\n", "No ranked profiles".yellow());
            continue;
        }
        let rows: Vec<MetaRow> = entries
            .iter()
            .take(top)
            .enumerate()
            .map(|(idx, e)| MetaRow {
                rank: format!("#{}", idx + 1),
                hero: hero_name(heroes, e.hero_id),
                profile: e.profile_id.clone(),
                score: e.score.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}\n", table);
    }
}

pub fn display_sync_report(report: &SyncReport) {
    display_success(&format!(
        "Synced {} heroes for {} ({} matchup fetches degraded to empty)",
        report.hero_count, report.date, report.failed_matchups
    ));
    display_info(&format!(
        "Ally pairs: {} rows from {}",
        report.pair_rows, report.source
    ));
    display_success(&format!(
        "Snapshot written: {}",
        report.snapshot_file.display()
    ));
}

pub fn display_sequence(steps: &[SequenceStep]) {
    println!("\n{}", "📋 Captains Mode Order (7.34)".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let rows: Vec<SequenceRow> = steps
        .iter()
        .enumerate()
        .map(|(idx, s)| SequenceRow {
            step: format!("{}", idx + 1),
            action: s.kind.to_string(),
            team: team_label(s.team).to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let bans = steps.iter().filter(|s| s.kind == StepKind::Ban).count();
    let picks = steps.len() - bans;
    println!("\n{} {} bans, {} picks\n", "Total:".bold(), bans, picks);
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
