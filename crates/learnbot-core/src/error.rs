//! Error types for the dialogue core.

use thiserror::Error;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    MissingToken,

    /// The placeholder offset could not be parsed.
    #[error("invalid UTC offset '{0}', expected something like +07:00")]
    InvalidUtcOffset(String),

    /// A locale file could not be read or parsed.
    #[error("failed to load locale {path}: {reason}")]
    Locale { path: String, reason: String },
}

/// Which guided flow an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Teaching a new trigger.
    Learn,
    /// Browsing and deleting triggers.
    Delete,
}

impl Flow {
    /// The command that restarts this flow.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Learn => "/learn",
            Self::Delete => "/deletetrigger",
        }
    }
}

/// A failure that ends a guided flow.
///
/// Every variant clears the caller's session; the orchestrator turns the
/// variant into the message the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The caller lacks admin rights (or lost them mid-flow).
    #[error("user is not authorized for {0:?}")]
    AuthorizationDenied(Flow),

    /// Input that cannot continue the flow.
    #[error("invalid input '{value}'")]
    Validation { value: String },

    /// The trigger is already taught.
    #[error("trigger already exists: {trigger}")]
    Conflict { trigger: String },

    /// The store did not complete the operation.
    #[error("backend unavailable during {0:?}")]
    BackendUnavailable(Flow),

    /// Session data the current step depends on is missing.
    #[error("session is missing {missing} during {flow:?}")]
    InternalState { flow: Flow, missing: &'static str },
}
