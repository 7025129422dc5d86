//! Error types for rolegate-discord

use thiserror::Error;

/// Main error type for rolegate-discord
#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("Discord token not set")]
    TokenNotSet,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Core error: {0}")]
    Core(#[from] rolegate_core::Error),
}

/// Result type alias for rolegate-discord
pub type Result<T> = std::result::Result<T, DiscordError>;
