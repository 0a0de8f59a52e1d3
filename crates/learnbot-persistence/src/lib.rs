//! Persistence layer for Learnbot.
//!
//! This crate defines the two storage contracts the bot depends on
//! ([`TriggerStore`] and [`AdminStore`]) and crash-safe JSON-file backends
//! for both, using atomic file operations (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use learnbot_models::{ResponseKind, TriggerRecord};
//! use learnbot_persistence::{JsonTriggerStore, TriggerStore};
//!
//! # async fn demo() -> learnbot_persistence::Result<()> {
//! let store = JsonTriggerStore::open("/home/user/.learnbot/data/triggers.json")?;
//! store
//!     .insert(TriggerRecord::new("hello", ResponseKind::Text, "hi {firstname}", 1))
//!     .await?;
//! assert!(store.contains("HELLO").await?);
//! # Ok(())
//! # }
//! ```

pub mod admin_store;
pub mod atomic;
pub mod error;
mod table;
pub mod trigger_store;

pub use admin_store::{AdminStore, JsonAdminStore};
pub use error::{PersistenceError, Result};
pub use trigger_store::{JsonTriggerStore, TriggerStore};
