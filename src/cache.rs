use crate::api::client::OpenDotaClient;
use crate::api::models::Hero;
use crate::error::AppError;
use crate::matrix::snapshot::save_json_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Roster freshness window, in minutes.
pub const HERO_CACHE_MAX_AGE_MINS: i64 = 30;

/// Disk cache for the hero roster. The roster changes rarely, so a
/// recent copy keeps repeated commands off the provider entirely.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeroCache {
    pub fetched_at: DateTime<Utc>,
    pub heroes: Vec<Hero>,
}

impl HeroCache {
    pub fn new(heroes: Vec<Hero>) -> Self {
        HeroCache {
            fetched_at: Utc::now(),
            heroes,
        }
    }

    /// A cache that fails to read or parse is simply absent.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        save_json_atomic(path, self)
    }

    pub fn is_stale(&self, max_age_mins: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_minutes() > max_age_mins
    }
}

/// Roster for this run: the disk copy when it is fresh enough and
/// non-empty, a provider fetch (cached for next time) otherwise.
pub fn load_or_fetch_heroes(
    client: &OpenDotaClient,
    path: &Path,
    max_age_mins: i64,
) -> Result<Vec<Hero>, AppError> {
    if let Some(cache) = HeroCache::load(path) {
        if !cache.is_stale(max_age_mins) && !cache.heroes.is_empty() {
            return Ok(cache.heroes);
        }
    }

    let heroes = client.heroes()?;
    HeroCache::new(heroes.clone()).save(path)?;
    Ok(heroes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::HeroRole;
    use chrono::Duration;

    fn roster() -> Vec<Hero> {
        vec![Hero {
            id: 1,
            name: "Anti-Mage".to_string(),
            roles: vec![HeroRole::Carry],
            icon: String::new(),
        }]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heroes.json");

        HeroCache::new(roster()).save(&path).unwrap();
        let cache = HeroCache::load(&path).unwrap();
        assert_eq!(cache.heroes.len(), 1);
        assert_eq!(cache.heroes[0].id, 1);
        assert_eq!(cache.heroes[0].name, "Anti-Mage");
    }

    #[test]
    fn missing_or_garbled_cache_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heroes.json");
        assert!(HeroCache::load(&path).is_none());

        fs::write(&path, "not json").unwrap();
        assert!(HeroCache::load(&path).is_none());
    }

    #[test]
    fn staleness_follows_fetch_age() {
        let cache = HeroCache {
            fetched_at: Utc::now() - Duration::minutes(45),
            heroes: roster(),
        };
        assert!(cache.is_stale(30));
        assert!(!cache.is_stale(60));
    }
}
