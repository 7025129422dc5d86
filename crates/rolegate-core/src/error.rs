//! Error types for rolegate-core

use thiserror::Error;

/// Main error type for rolegate-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Code backend error: {0}")]
    Backend(String),

    #[error("Authority error: {0}")]
    Authority(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rolegate-core
pub type Result<T> = std::result::Result<T, Error>;
