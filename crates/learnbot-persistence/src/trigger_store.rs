//! Trigger store trait and its JSON-file backend.

use std::path::PathBuf;

use async_trait::async_trait;
use learnbot_models::{canonical, TriggerRecord};
use tracing::{debug, info};

use crate::error::{PersistenceError, Result};
use crate::table::JsonTable;

/// Backend for learned triggers.
///
/// Keys are compared in canonical form. Implementations must reject a
/// duplicate key with [`PersistenceError::Conflict`] as part of the insert
/// itself, not through a separate lookup.
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// Inserts a new trigger.
    async fn insert(&self, record: TriggerRecord) -> Result<()>;

    /// Fetches the trigger with the given key.
    async fn get(&self, trigger_text: &str) -> Result<Option<TriggerRecord>>;

    /// Whether a trigger with the given key exists.
    async fn contains(&self, trigger_text: &str) -> Result<bool> {
        Ok(self.get(trigger_text).await?.is_some())
    }

    /// All triggers, oldest first.
    async fn list(&self) -> Result<Vec<TriggerRecord>>;

    /// Removes the trigger with the given key, returning how many rows went.
    async fn remove(&self, trigger_text: &str) -> Result<usize>;
}

/// Triggers stored as a JSON array in a single file.
///
/// ```text
/// data_dir/
/// └── triggers.json
/// ```
pub struct JsonTriggerStore {
    table: JsonTable<TriggerRecord>,
}

impl JsonTriggerStore {
    /// Opens (or starts) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let table = JsonTable::open(path)?;
        info!(path = %table.path().display(), "Trigger store ready");
        Ok(Self { table })
    }
}

#[async_trait]
impl TriggerStore for JsonTriggerStore {
    async fn insert(&self, record: TriggerRecord) -> Result<()> {
        let mut record = record;
        record.trigger_text = canonical(&record.trigger_text);
        let key = record.trigger_text.clone();

        self.table
            .mutate(move |rows| {
                if rows.iter().any(|r| r.trigger_text == record.trigger_text) {
                    return Err(PersistenceError::Conflict {
                        kind: "trigger".to_string(),
                        id: record.trigger_text,
                    });
                }
                rows.push(record);
                Ok(Some(()))
            })
            .await?;

        debug!(trigger = %key, "Inserted trigger");
        Ok(())
    }

    async fn get(&self, trigger_text: &str) -> Result<Option<TriggerRecord>> {
        let key = canonical(trigger_text);
        Ok(self
            .table
            .read(|rows| rows.iter().find(|r| r.trigger_text == key).cloned()))
    }

    async fn list(&self) -> Result<Vec<TriggerRecord>> {
        let mut rows = self.table.read(|rows| rows.to_vec());
        // Stable sort keeps insertion order for equal timestamps.
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn remove(&self, trigger_text: &str) -> Result<usize> {
        let key = canonical(trigger_text);
        let removed = self
            .table
            .mutate(move |rows| {
                let before = rows.len();
                rows.retain(|r| r.trigger_text != key);
                let removed = before - rows.len();
                Ok((removed > 0).then_some(removed))
            })
            .await?
            .unwrap_or(0);

        debug!(trigger = %trigger_text, removed, "Removed trigger");
        Ok(removed)
    }
}
