use crate::advisor::profile::Profile;
use crate::api::models::MatchDto;
use crate::error::AppError;
use crate::matrix::builder::HeroId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use strum::{Display, EnumString};

/// Latest minute a draft can be evaluated at.
pub const MAX_MINUTE: u32 = 60;

/// Heroes per side.
pub const TEAM_SIZE: usize = 5;

/// One drafted slot: the hero and, when the drafter chose one, the
/// profile it plays. Picks without a profile resolve through the
/// profile book at scoring time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
    pub hero_id: HeroId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftTeams {
    #[serde(default)]
    pub team1: Vec<DraftPick>,
    #[serde(default)]
    pub team2: Vec<DraftPick>,
}

/// Declared lane positions per slot; `null` slots fall back to slot
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftRoles {
    #[serde(default)]
    pub team1: Vec<Option<u8>>,
    #[serde(default)]
    pub team2: Vec<Option<u8>>,
}

/// A draft in progress, as read from a draft file. Team 1 is always
/// "your" side for suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftState {
    #[serde(default = "default_minute")]
    pub minute: u32,
    #[serde(default)]
    pub teams: DraftTeams,
    #[serde(default)]
    pub picked: Vec<HeroId>,
    #[serde(default)]
    pub banned: Vec<HeroId>,
    #[serde(default)]
    pub roles: DraftRoles,
}

fn default_minute() -> u32 {
    15
}

impl Default for DraftState {
    fn default() -> Self {
        DraftState {
            minute: default_minute(),
            teams: DraftTeams::default(),
            picked: Vec::new(),
            banned: Vec::new(),
            roles: DraftRoles::default(),
        }
    }
}

impl DraftState {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let state: DraftState = serde_json::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.minute > MAX_MINUTE {
            return Err(AppError::MalformedInput(format!(
                "minute {} outside the draftable range 0..={}",
                self.minute, MAX_MINUTE
            )));
        }
        for (side, picks) in [("team1", &self.teams.team1), ("team2", &self.teams.team2)] {
            if picks.len() > TEAM_SIZE {
                return Err(AppError::MalformedInput(format!(
                    "{} lists {} heroes; a side holds at most {}",
                    side,
                    picks.len(),
                    TEAM_SIZE
                )));
            }
        }
        Ok(())
    }

    pub fn team1_ids(&self) -> Vec<HeroId> {
        self.teams.team1.iter().map(|p| p.hero_id).collect()
    }

    pub fn team2_ids(&self) -> Vec<HeroId> {
        self.teams.team2.iter().map(|p| p.hero_id).collect()
    }

    /// Every hero id the draft has consumed. A hero on either team is
    /// taken even when the `picked` list omits it.
    pub fn taken(&self) -> BTreeSet<HeroId> {
        self.picked
            .iter()
            .chain(self.banned.iter())
            .copied()
            .chain(self.team1_ids())
            .chain(self.team2_ids())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Team1,
    Team2,
}

impl TeamSide {
    pub fn other(self) -> TeamSide {
        match self {
            TeamSide::Team1 => TeamSide::Team2,
            TeamSide::Team2 => TeamSide::Team1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Ban,
    Pick,
}

/// One slot in the Captains Mode schedule.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SequenceStep {
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub team: TeamSide,
}

/// Captains Mode ban/pick order for patch 7.34: seven opening bans,
/// then 1-3-1 picks, three bans, the mirrored pick phase, four bans and
/// the closing pick pair.
pub fn cm_sequence(first_pick: TeamSide) -> Vec<SequenceStep> {
    let fp = first_pick;
    let sp = fp.other();
    let phases: [(StepKind, &[TeamSide]); 6] = [
        (StepKind::Ban, &[sp, fp, sp, fp, sp, sp, fp]),
        (StepKind::Pick, &[fp, sp, sp, sp, fp]),
        (StepKind::Ban, &[fp, sp, fp]),
        (StepKind::Pick, &[sp, fp, fp, fp, sp]),
        (StepKind::Ban, &[fp, sp, fp, sp]),
        (StepKind::Pick, &[fp, sp]),
    ];
    phases
        .iter()
        .flat_map(|&(kind, teams)| teams.iter().map(move |&team| SequenceStep { kind, team }))
        .collect()
}

/// Pull a match id out of free-form input: a raw id or any URL that
/// embeds one. The last digit run in the string must be at least seven
/// digits long.
pub fn parse_match_query(query: &str) -> Option<&str> {
    let bytes = query.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if end - start >= 7 {
        Some(&query[start..end])
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportedPick {
    pub hero_id: HeroId,
    pub team: u8,
}

/// Draft-relevant slice of a finished match.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedDraft {
    pub match_id: String,
    pub radiant: String,
    pub dire: String,
    pub duration: i64,
    pub start_time: i64,
    pub picks: Vec<ImportedPick>,
}

/// Extract the picked heroes from match details. The pick/ban list is
/// authoritative when present; parsed matches without one fall back to
/// the player slots.
pub fn draft_from_match(match_id: &str, m: &MatchDto) -> ImportedDraft {
    let mut picks: Vec<ImportedPick> = m
        .picks_bans
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter(|pb| pb.is_pick)
        .map(|pb| ImportedPick {
            hero_id: pb.hero_id,
            team: if pb.team == 0 { 1 } else { 2 },
        })
        .collect();
    if picks.is_empty() {
        picks = m
            .players
            .iter()
            .map(|p| ImportedPick {
                hero_id: p.hero_id,
                team: if p.is_radiant.unwrap_or(false) { 1 } else { 2 },
            })
            .collect();
    }

    let team_name = |t: &Option<crate::api::models::TeamNameDto>, fallback: &str| {
        t.as_ref()
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| fallback.to_string())
    };

    ImportedDraft {
        match_id: match_id.to_string(),
        radiant: team_name(&m.radiant_team, "Radiant"),
        dire: team_name(&m.dire_team, "Dire"),
        duration: m.duration,
        start_time: m.start_time,
        picks,
    }
}

impl ImportedDraft {
    /// Draft file ready for `suggest`/`story`, radiant as team 1.
    pub fn to_draft_state(&self) -> DraftState {
        let side = |team: u8| -> Vec<DraftPick> {
            self.picks
                .iter()
                .filter(|p| p.team == team)
                .take(TEAM_SIZE)
                .map(|p| DraftPick { hero_id: p.hero_id, profile: None })
                .collect()
        };
        let teams = DraftTeams { team1: side(1), team2: side(2) };
        let picked = teams
            .team1
            .iter()
            .chain(teams.team2.iter())
            .map(|p| p.hero_id)
            .collect();
        DraftState { teams, picked, ..DraftState::default() }
    }
}
