//! A JSON array file mirrored in memory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Rows of one table, loaded once and written back atomically on every
/// mutation.
///
/// Mutations run on the blocking pool and hold the writer lock for the whole
/// check-modify-write sequence, so two concurrent inserts of the same key are
/// decided by whichever takes it first. The rows lock is only held to copy
/// or swap the in-memory rows, never across file I/O, so readers do not wait
/// for a write to reach disk.
pub(crate) struct JsonTable<T> {
    path: PathBuf,
    rows: Arc<RwLock<Vec<T>>>,
    writer: Arc<Mutex<()>>,
}

impl<T> JsonTable<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Loads the table from `path`, starting empty if the file is missing.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows: Vec<T> = read_json_optional(&path)?.unwrap_or_default();
        debug!(path = %path.display(), rows = rows.len(), "Opened table");
        Ok(Self {
            path,
            rows: Arc::new(RwLock::new(rows)),
            writer: Arc::new(Mutex::new(())),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a read-only closure over the current rows.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let rows = self.rows.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&rows)
    }

    /// Applies `f` to a copy of the rows and persists the result.
    ///
    /// `f` returns `None` when it changed nothing; the file is then left
    /// alone and `None` is returned. If `f` fails or the write fails, the
    /// in-memory rows are left unchanged.
    pub(crate) async fn mutate<R, F>(&self, f: F) -> Result<Option<R>>
    where
        R: Send + 'static,
        F: FnOnce(&mut Vec<T>) -> Result<Option<R>> + Send + 'static,
    {
        let rows = Arc::clone(&self.rows);
        let writer = Arc::clone(&self.writer);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let _writing = lock(&writer);
            let mut next = rows
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            let Some(out) = f(&mut next)? else {
                return Ok(None);
            };
            atomic_write_json(&path, &next)?;
            *rows.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
            Ok(Some(out))
        })
        .await
        .map_err(|e| PersistenceError::TaskFailed(e.to_string()))?
    }
}

fn lock(writer: &Mutex<()>) -> MutexGuard<'_, ()> {
    writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_does_not_wait_for_writer() {
        let dir = tempdir().unwrap();
        let table: JsonTable<u32> = JsonTable::open(dir.path().join("t.json")).unwrap();
        table.mutate(|rows| {
            rows.push(1);
            Ok(Some(()))
        })
        .await
        .unwrap();

        // A write in progress holds only the writer lock.
        let _writing = lock(&table.writer);
        assert_eq!(table.read(|rows| rows.to_vec()), vec![1]);
    }

    #[tokio::test]
    async fn test_unchanged_mutation_skips_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.json");
        let table: JsonTable<u32> = JsonTable::open(&path).unwrap();

        let out = table.mutate(|_rows| Ok(None::<()>)).await.unwrap();
        assert!(out.is_none());
        assert!(!path.exists());

        table.mutate(|rows| {
            rows.push(7);
            Ok(Some(()))
        })
        .await
        .unwrap();
        assert!(path.exists());
    }
}
