//! Admin roster store trait and its JSON-file backend.

use std::path::PathBuf;

use async_trait::async_trait;
use learnbot_models::AdminRecord;
use tracing::{debug, info};

use crate::error::{PersistenceError, Result};
use crate::table::JsonTable;

/// Backend for the admin roster.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Adds an admin. A user id already on the roster yields
    /// [`PersistenceError::Conflict`].
    async fn insert(&self, record: AdminRecord) -> Result<()>;

    /// Removes an admin, returning how many rows went.
    async fn remove(&self, user_id: i64) -> Result<usize>;

    /// The whole roster, in the order it was granted.
    async fn list(&self) -> Result<Vec<AdminRecord>>;
}

/// Admin roster stored as a JSON array in a single file.
pub struct JsonAdminStore {
    table: JsonTable<AdminRecord>,
}

impl JsonAdminStore {
    /// Opens (or starts) the roster at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let table = JsonTable::open(path)?;
        info!(path = %table.path().display(), "Admin store ready");
        Ok(Self { table })
    }
}

#[async_trait]
impl AdminStore for JsonAdminStore {
    async fn insert(&self, record: AdminRecord) -> Result<()> {
        let user_id = record.user_id;
        self.table
            .mutate(move |rows| {
                if rows.iter().any(|r| r.user_id == record.user_id) {
                    return Err(PersistenceError::Conflict {
                        kind: "admin".to_string(),
                        id: record.user_id.to_string(),
                    });
                }
                rows.push(record);
                Ok(Some(()))
            })
            .await?;

        debug!(user_id, "Inserted admin");
        Ok(())
    }

    async fn remove(&self, user_id: i64) -> Result<usize> {
        let removed = self
            .table
            .mutate(move |rows| {
                let before = rows.len();
                rows.retain(|r| r.user_id != user_id);
                let removed = before - rows.len();
                Ok((removed > 0).then_some(removed))
            })
            .await?
            .unwrap_or(0);

        debug!(user_id, removed, "Removed admin");
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<AdminRecord>> {
        Ok(self.table.read(|rows| rows.to_vec()))
    }
}
