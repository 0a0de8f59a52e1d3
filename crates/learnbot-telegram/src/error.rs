//! Error types for the Telegram bot.

use learnbot_core::ConfigError;
use learnbot_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// A store could not be opened.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
