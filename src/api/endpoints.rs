// OpenDota endpoint URLs. Paths are formatted in client.rs; query
// parameters (api_key, sql) are attached per request.

pub const HEROES_ENDPOINT: &str = "https://api.opendota.com/api/constants/heroes";
pub const MATCHUPS_ENDPOINT: &str = "https://api.opendota.com/api/heroes/{id}/matchups";
pub const EXPLORER_ENDPOINT: &str = "https://api.opendota.com/api/explorer";
pub const PRO_MATCHES_ENDPOINT: &str = "https://api.opendota.com/api/proMatches";
pub const MATCH_ENDPOINT: &str = "https://api.opendota.com/api/matches/{id}";
pub const BENCHMARKS_ENDPOINT: &str = "https://api.opendota.com/api/benchmarks";

pub const STEAM_CDN: &str = "https://cdn.cloudflare.steamstatic.com";

/// Ally-pair aggregation over recent public matches; `{days}` is the
/// lookback window.
pub const EXPLORER_ALLY_PAIRS_SQL: &str = r#"
    SELECT
      h1.hero_id AS a, h2.hero_id AS b,
      COUNT(*) AS games,
      SUM(CASE WHEN player_matches.is_victory THEN 1 ELSE 0 END) AS wins
    FROM player_matches
    JOIN matches ON matches.match_id = player_matches.match_id
    JOIN player_matches AS h2 ON h2.match_id = player_matches.match_id
      AND h2.player_slot < 128 = player_matches.player_slot < 128
      AND h2.player_slot != player_matches.player_slot
    JOIN player_matches AS h1 ON h1.match_id = player_matches.match_id
      AND h1.player_slot = player_matches.player_slot
    WHERE matches.start_time > EXTRACT(EPOCH FROM NOW() - INTERVAL '{days} days')
    GROUP BY a, b
"#;
