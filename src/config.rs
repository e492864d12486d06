use crate::error::AppError;
use std::env;
use std::path::PathBuf;

/// Weight for matrix-driven context in advisor scoring.
const DEFAULT_CTX_WEIGHT: f64 = 0.25;
/// Provider request pacing (requests per second).
const DEFAULT_RPS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    /// OpenDota API key, appended to every request when present.
    pub api_key: Option<String>,
    /// Use the explorer SQL path for ally pairs instead of the
    /// pro-match fallback.
    pub use_explorer: bool,
    pub ctx_weight: f64,
    pub data_dir: PathBuf,
    /// Canonical top-K snapshot file read by the advisor.
    pub snapshot_file: PathBuf,
    pub requests_per_sec: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OD_API_KEY").ok().filter(|k| !k.is_empty());
        let use_explorer = env::var("OD_EXPLORER").map(|v| v == "1").unwrap_or(false);

        let ctx_weight = match env::var("CTX_WEIGHT") {
            Ok(raw) => raw.parse::<f64>().map_err(|_| {
                AppError::ConfigError(format!("CTX_WEIGHT is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_CTX_WEIGHT,
        };

        let requests_per_sec = match env::var("OD_RPS") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::ConfigError(format!("OD_RPS must be a positive integer: {}", raw))
                })?,
            Err(_) => DEFAULT_RPS,
        };

        let data_dir = match env::var("DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".dota_advisor"),
        };

        let snapshot_file = match env::var("MATRIX_SNAPSHOT") {
            Ok(p) => PathBuf::from(p),
            Err(_) => data_dir.join("snapshots").join("matrix-topk.json"),
        };

        Ok(Config {
            api_key,
            use_explorer,
            ctx_weight,
            data_dir,
            snapshot_file,
            requests_per_sec,
        })
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn heroes_cache_file(&self) -> PathBuf {
        self.data_dir.join("heroes.json")
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.data_dir.join("profiles.json")
    }
}
