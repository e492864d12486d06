use super::endpoints::STEAM_CDN;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Role strings as the provider reports them (capitalized).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum HeroRole {
    Carry,
    Support,
    Nuker,
    Disabler,
    Initiator,
    Durable,
    Escape,
    Pusher,
    #[strum(default)]
    Other(String),
}

impl From<String> for HeroRole {
    fn from(s: String) -> Self {
        HeroRole::from_str(&s).unwrap_or(HeroRole::Other(s))
    }
}

impl From<HeroRole> for String {
    fn from(role: HeroRole) -> Self {
        role.to_string()
    }
}

/// Hero reference entry, cached on disk between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: i32,
    pub name: String,
    pub roles: Vec<HeroRole>,
    pub icon: String,
}

// constants/heroes response value (the response is an object keyed by
// internal hero name)
#[derive(Debug, Deserialize)]
pub struct HeroDto {
    pub id: i32,
    pub localized_name: String,
    #[serde(default)]
    pub roles: Vec<HeroRole>,
    #[serde(default)]
    pub icon: String,
}

impl From<HeroDto> for Hero {
    fn from(dto: HeroDto) -> Self {
        Hero {
            id: dto.id,
            name: dto.localized_name,
            roles: dto.roles,
            icon: format!("{}{}", STEAM_CDN, dto.icon),
        }
    }
}

// heroes/{id}/matchups response entry
#[derive(Debug, Deserialize)]
pub struct MatchupDto {
    pub hero_id: i32,
    pub games_played: u32,
    pub wins: u32,
}

// explorer response
#[derive(Debug, Deserialize)]
pub struct ExplorerPairsDto {
    #[serde(default)]
    pub rows: Vec<ExplorerRowDto>,
}

#[derive(Debug, Deserialize)]
pub struct ExplorerRowDto {
    pub a: i32,
    pub b: i32,
    pub games: u32,
    pub wins: u32,
}

// proMatches response entry; per-slot hero ids are present only on some
// payloads and a missing or zero slot disqualifies the side
#[derive(Debug, Deserialize)]
pub struct ProMatchDto {
    #[serde(default)]
    pub radiant_win: bool,
    #[serde(default)]
    pub radiant1: Option<i32>,
    #[serde(default)]
    pub radiant2: Option<i32>,
    #[serde(default)]
    pub radiant3: Option<i32>,
    #[serde(default)]
    pub radiant4: Option<i32>,
    #[serde(default)]
    pub radiant5: Option<i32>,
    #[serde(default)]
    pub dire1: Option<i32>,
    #[serde(default)]
    pub dire2: Option<i32>,
    #[serde(default)]
    pub dire3: Option<i32>,
    #[serde(default)]
    pub dire4: Option<i32>,
    #[serde(default)]
    pub dire5: Option<i32>,
}

impl ProMatchDto {
    pub fn radiant_heroes(&self) -> Vec<i32> {
        [
            self.radiant1,
            self.radiant2,
            self.radiant3,
            self.radiant4,
            self.radiant5,
        ]
        .into_iter()
        .flatten()
        .filter(|&id| id != 0)
        .collect()
    }

    pub fn dire_heroes(&self) -> Vec<i32> {
        [self.dire1, self.dire2, self.dire3, self.dire4, self.dire5]
            .into_iter()
            .flatten()
            .filter(|&id| id != 0)
            .collect()
    }
}

// matches/{id} response, trimmed to the draft-relevant fields
#[derive(Debug, Deserialize)]
pub struct MatchDto {
    #[serde(default)]
    pub picks_bans: Option<Vec<PickBanDto>>,
    #[serde(default)]
    pub players: Vec<MatchPlayerDto>,
    #[serde(default)]
    pub radiant_team: Option<TeamNameDto>,
    #[serde(default)]
    pub dire_team: Option<TeamNameDto>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub start_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct PickBanDto {
    pub is_pick: bool,
    pub hero_id: i32,
    pub team: i32,
}

#[derive(Debug, Deserialize)]
pub struct MatchPlayerDto {
    pub hero_id: i32,
    #[serde(default, rename = "isRadiant")]
    pub is_radiant: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TeamNameDto {
    #[serde(default)]
    pub name: Option<String>,
}

// benchmarks?hero_id= response
#[derive(Debug, Deserialize)]
pub struct BenchmarksDto {
    #[serde(default)]
    pub result: Option<BenchmarkResultDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BenchmarkResultDto {
    #[serde(default)]
    pub gold_per_min: Vec<BenchmarkPointDto>,
    #[serde(default)]
    pub xp_per_min: Vec<BenchmarkPointDto>,
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkPointDto {
    #[serde(default)]
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_dto_converts_with_cdn_icon() {
        let dto: HeroDto = serde_json::from_str(
            r#"{"id":1,"localized_name":"Anti-Mage","roles":["Carry","Escape"],"icon":"/apps/dota2/am.png"}"#,
        )
        .unwrap();
        let hero: Hero = dto.into();
        assert_eq!(hero.name, "Anti-Mage");
        assert_eq!(hero.roles, vec![HeroRole::Carry, HeroRole::Escape]);
        assert!(hero.icon.starts_with("https://cdn.cloudflare.steamstatic.com"));
    }

    #[test]
    fn unknown_roles_are_preserved_as_other() {
        let role = HeroRole::from("Jungler".to_string());
        assert_eq!(role, HeroRole::Other("Jungler".to_string()));
        assert_eq!(role.to_string(), "Jungler");
    }

    #[test]
    fn pro_match_sides_drop_missing_and_zero_slots() {
        let m: ProMatchDto = serde_json::from_str(
            r#"{"radiant_win":true,"radiant1":1,"radiant2":2,"radiant3":0,"dire1":6}"#,
        )
        .unwrap();
        assert_eq!(m.radiant_heroes(), vec![1, 2]);
        assert_eq!(m.dire_heroes(), vec![6]);
    }
}
