//! Error types for gymbot.

use thiserror::Error;

/// Library-level error type for gymbot operations.
#[derive(Error, Debug)]
pub enum GymError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Booking store error: {0}")]
    Store(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Calendar authorization error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for gymbot operations.
pub type Result<T> = std::result::Result<T, GymError>;
