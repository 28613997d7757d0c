//! Error handling for the application

use thiserror::Error;

/// Registry-related errors, surfaced synchronously to the command path
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Not a valid Zalando.nl product URL: {0}")]
    InvalidUrl(String),

    #[error("Product is already being monitored: {0}")]
    Duplicate(String),

    #[error("Product is not being monitored: {0}")]
    NotFound(String),

    #[error("Tracked-product limit reached ({limit} per user)")]
    QuotaExceeded { limit: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch-related errors; the scheduler treats all variants uniformly
/// (count the failure, move on) but logs which one occurred
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Product page not found (404)")]
    NotFound,

    #[error("Request blocked or rate-limited by the site")]
    Blocked,

    #[error("Failed to parse product page: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// State-store errors; unrecoverable at the scheduler boundary
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Telegram API errors
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),
}
