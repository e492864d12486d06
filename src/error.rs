use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid matrix snapshot: {0}")]
    SnapshotInvalid(String),

    #[error("Matrix not loaded yet - run `dota_advisor sync` first")]
    SnapshotNotLoaded,

    #[error("Invalid input: {0}")]
    MalformedInput(String),

    #[error("Unknown hero id: {0}")]
    UnknownHero(i32),
}
