use crate::config::Config;
use crate::error::AppError;
use crate::matrix::builder::{AllyPair, HeroId, VsRaw};
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints::{
    BENCHMARKS_ENDPOINT, EXPLORER_ALLY_PAIRS_SQL, EXPLORER_ENDPOINT, HEROES_ENDPOINT,
    MATCHUPS_ENDPOINT, MATCH_ENDPOINT, PRO_MATCHES_ENDPOINT,
};
use super::models::{
    BenchmarkResultDto, BenchmarksDto, ExplorerPairsDto, Hero, HeroDto, MatchDto, MatchupDto,
    ProMatchDto,
};

const USER_AGENT: &str = "dota_advisor/0.9.0";
const BACKOFF_FACTOR: f64 = 1.8;

/// Retry schedule for one request; the delay grows by [`BACKOFF_FACTOR`]
/// per attempt.
#[derive(Debug, Clone, Copy)]
struct Backoff {
    tries: u32,
    base_ms: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff { tries: 5, base_ms: 600 }
    }
}

/// Matchup pages rate-limit the hardest during a full-roster sync.
const MATCHUP_BACKOFF: Backoff = Backoff { tries: 6, base_ms: 700 };

fn backoff_delay(backoff: Backoff, attempt: u32) -> Duration {
    let ms = backoff.base_ms as f64 * BACKOFF_FACTOR.powi(attempt as i32);
    Duration::from_millis(ms as u64)
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

pub struct OpenDotaClient {
    config: Config,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
}

impl OpenDotaClient {
    pub fn new(config: Config) -> Self {
        let rps = NonZeroU32::new(config.requests_per_sec).unwrap_or(NonZeroU32::MIN);
        OpenDotaClient {
            config,
            limiter: RateLimiter::direct(Quota::per_second(rps)),
            clock: DefaultClock::default(),
        }
    }

    /// Block until the limiter admits the next request.
    fn pace(&self) {
        while let Err(not_until) = self.limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }

    /// GET with pacing and retry. `Ok(None)` is a 404, which every
    /// caller treats as an empty dataset rather than a failure. 429 and
    /// 5xx back off and retry; transport errors likewise, surfacing the
    /// last one once the schedule is spent.
    fn execute_request(
        &self,
        url: &str,
        query: &[(&str, &str)],
        backoff: Backoff,
    ) -> Result<Option<String>, AppError> {
        let mut last_err = None;
        for attempt in 0..backoff.tries {
            self.pace();

            let mut request = ureq::get(url).set("User-Agent", USER_AGENT);
            for &(name, value) in query {
                request = request.query(name, value);
            }
            if let Some(key) = &self.config.api_key {
                request = request.query("api_key", key);
            }

            match request.call() {
                Ok(resp) => return Ok(Some(resp.into_string()?)),
                Err(ureq::Error::Status(404, _)) => return Ok(None),
                Err(ureq::Error::Status(code, _)) if code == 429 || (500..=599).contains(&code) => {
                    thread::sleep(backoff_delay(backoff, attempt));
                }
                Err(ureq::Error::Status(code, resp)) => {
                    let body = resp.into_string().unwrap_or_default();
                    return Err(AppError::HttpError(format!(
                        "HTTP {}: {}",
                        code,
                        snippet(&body)
                    )));
                }
                Err(e) => {
                    last_err = Some(AppError::HttpError(e.to_string()));
                    thread::sleep(backoff_delay(backoff, attempt));
                }
            }
        }
        Err(last_err.unwrap_or(AppError::RateLimited))
    }

    /// Roster from constants/heroes, sorted by id. The response is an
    /// object keyed by internal hero name.
    pub fn heroes(&self) -> Result<Vec<Hero>, AppError> {
        let body = self
            .execute_request(HEROES_ENDPOINT, &[], Backoff::default())?
            .ok_or_else(|| AppError::HttpError("heroes fetch failed".to_string()))?;
        let by_name: BTreeMap<String, HeroDto> = serde_json::from_str(&body)?;
        let mut heroes: Vec<Hero> = by_name.into_values().map(Hero::from).collect();
        heroes.sort_by_key(|h| h.id);
        Ok(heroes)
    }

    /// Directed matchup rows for one hero. A 404 means the hero has no
    /// recorded data yet and yields an empty row set.
    pub fn matchups(&self, hero_id: HeroId) -> Result<Vec<VsRaw>, AppError> {
        let url = MATCHUPS_ENDPOINT.replace("{id}", &hero_id.to_string());
        let Some(body) = self.execute_request(&url, &[], MATCHUP_BACKOFF)? else {
            return Ok(Vec::new());
        };
        let rows: Vec<MatchupDto> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().map(VsRaw::from).collect())
    }

    /// Ally-pair rows aggregated server-side over the last `days` days.
    pub fn explorer_pairs(&self, days: u32) -> Result<Vec<AllyPair>, AppError> {
        let sql = EXPLORER_ALLY_PAIRS_SQL.replace("{days}", &days.to_string());
        let body = self
            .execute_request(EXPLORER_ENDPOINT, &[("sql", sql.as_str())], Backoff::default())?
            .ok_or_else(|| AppError::HttpError("explorer allies fetch failed".to_string()))?;
        let page: ExplorerPairsDto = serde_json::from_str(&body)?;
        Ok(page.rows.into_iter().map(AllyPair::from).collect())
    }

    /// Recent pro matches, `pages` requests deep. A failed page ends the
    /// pagination with whatever landed before it.
    pub fn pro_matches(&self, pages: u32) -> Result<Vec<ProMatchDto>, AppError> {
        let mut all = Vec::new();
        for _ in 0..pages {
            let body = match self.execute_request(PRO_MATCHES_ENDPOINT, &[], Backoff::default()) {
                Ok(Some(body)) => body,
                Ok(None) | Err(_) => break,
            };
            let batch: Vec<ProMatchDto> = serde_json::from_str(&body)?;
            all.extend(batch);
        }
        Ok(all)
    }

    pub fn match_details(&self, match_id: &str) -> Result<MatchDto, AppError> {
        let url = MATCH_ENDPOINT.replace("{id}", match_id);
        let body = self
            .execute_request(&url, &[], Backoff::default())?
            .ok_or_else(|| AppError::HttpError(format!("match {} not found", match_id)))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Percentile benchmarks for one hero; missing data is an empty
    /// result, not an error.
    pub fn benchmarks(&self, hero_id: HeroId) -> Result<BenchmarkResultDto, AppError> {
        let id = hero_id.to_string();
        let Some(body) =
            self.execute_request(BENCHMARKS_ENDPOINT, &[("hero_id", id.as_str())], Backoff::default())?
        else {
            return Ok(BenchmarkResultDto::default());
        };
        let page: BenchmarksDto = serde_json::from_str(&body)?;
        Ok(page.result.unwrap_or_default())
    }
}
