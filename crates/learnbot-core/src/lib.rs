//! Learnbot Core - the transport-independent half of the bot.
//!
//! - **config**: State directory layout and environment settings
//! - **locale**: Localized message templates with language fallback
//! - **placeholders**: `{token}` substitution in learned text responses
//! - **auth**: Authorization cache over the admin roster
//! - **triggers**: Outcome-returning trigger store adapter
//! - **conversation**: Per-user teach and delete flows
//! - **matcher**: Exact, case-folded trigger responses
//! - **dialogue**: Command routing over all of the above
//!
//! Transports turn what they receive into [`Inbound`] events and
//! [`Action`]s, hand them to a [`Dialogue`], and deliver the [`Reply`]
//! values that come back.

pub mod auth;
pub mod config;
pub mod conversation;
pub mod dialogue;
pub mod error;
pub mod event;
pub mod locale;
pub mod matcher;
pub mod placeholders;
pub mod triggers;

pub use auth::AuthorizationCache;
pub use config::{ensure_all_dirs, env_file, state_dir, BotConfig};
pub use conversation::{Conversation, Origin, SessionState};
pub use dialogue::{Dialogue, DialogueOptions};
pub use error::{ConfigError, Flow, FlowError};
pub use event::{
    Action, BotIdentity, Button, Chat, Content, Inbound, Keyboard, Reply, Sender, TextReply,
};
pub use locale::Localizer;
pub use triggers::{AddOutcome, TriggerRepository};
