//! Outcome-returning wrapper over a [`TriggerStore`].

use std::sync::Arc;

use learnbot_models::{canonical, ResponseKind, TriggerRecord};
use learnbot_persistence::{Result, TriggerStore};
use tracing::{error, info, warn};

/// Result of teaching a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyExists,
    Failed,
}

/// Trigger operations used by the dialogue.
///
/// Texts are canonicalized here before they reach the store.
#[derive(Clone)]
pub struct TriggerRepository {
    store: Arc<dyn TriggerStore>,
}

impl TriggerRepository {
    pub fn new(store: Arc<dyn TriggerStore>) -> Self {
        Self { store }
    }

    /// Stores a new trigger. Duplicates, including ones inserted
    /// concurrently, come back as [`AddOutcome::AlreadyExists`].
    pub async fn add(
        &self,
        trigger_text: &str,
        kind: ResponseKind,
        content: &str,
        creator_id: i64,
    ) -> AddOutcome {
        let key = canonical(trigger_text);
        if key.is_empty() {
            warn!("Refusing to store an empty trigger");
            return AddOutcome::Failed;
        }

        let record = TriggerRecord::new(&key, kind, content, creator_id);
        match self.store.insert(record).await {
            Ok(()) => {
                info!(trigger = %key, kind = %kind, creator_id, "Trigger learned");
                AddOutcome::Created
            }
            Err(e) if e.is_conflict() => AddOutcome::AlreadyExists,
            Err(e) => {
                error!(trigger = %key, error = %e, "Failed to store trigger");
                AddOutcome::Failed
            }
        }
    }

    /// The trigger matching `text` exactly after case folding.
    pub async fn find_response(&self, text: &str) -> Option<TriggerRecord> {
        match self.store.get(&canonical(text)).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "Trigger lookup failed");
                None
            }
        }
    }

    /// Whether `text` is already taught. Lookup failures read as absent.
    pub async fn exists(&self, text: &str) -> bool {
        match self.store.contains(&canonical(text)).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "Trigger existence check failed");
                false
            }
        }
    }

    /// Every trigger, oldest first.
    pub async fn list_all(&self) -> Result<Vec<TriggerRecord>> {
        self.store.list().await
    }

    /// Removes a trigger, returning whether anything was removed.
    pub async fn delete(&self, text: &str) -> bool {
        let key = canonical(text);
        match self.store.remove(&key).await {
            Ok(0) => false,
            Ok(_) => {
                info!(trigger = %key, "Trigger deleted");
                true
            }
            Err(e) => {
                error!(trigger = %key, error = %e, "Failed to delete trigger");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnbot_persistence::JsonTriggerStore;
    use tempfile::tempdir;

    fn repository(dir: &std::path::Path) -> TriggerRepository {
        let store = JsonTriggerStore::open(dir.join("triggers.json")).unwrap();
        TriggerRepository::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_add_twice_any_casing() {
        let dir = tempdir().unwrap();
        let repo = repository(dir.path());

        for (first, second) in [("hello", "hello"), ("Wave", "WAVE"), (" Ok ", "ok")] {
            assert_eq!(repo.add(first, ResponseKind::Text, "x", 1).await, AddOutcome::Created);
            assert_eq!(
                repo.add(second, ResponseKind::Text, "y", 1).await,
                AddOutcome::AlreadyExists
            );
        }
    }

    #[tokio::test]
    async fn test_find_exists_delete() {
        let dir = tempdir().unwrap();
        let repo = repository(dir.path());
        repo.add("Good Morning", ResponseKind::Sticker, "CAAD", 3).await;

        let found = repo.find_response("GOOD MORNING").await.unwrap();
        assert_eq!(found.trigger_text, "good morning");
        assert_eq!(found.response_type, ResponseKind::Sticker);
        assert!(repo.exists("good morning").await);

        assert!(repo.delete("Good Morning").await);
        assert!(!repo.delete("good morning").await);
        assert!(repo.find_response("good morning").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_trigger_rejected() {
        let dir = tempdir().unwrap();
        let repo = repository(dir.path());
        assert_eq!(repo.add("   ", ResponseKind::Text, "x", 1).await, AddOutcome::Failed);
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_single_winner() {
        let dir = tempdir().unwrap();
        let repo = repository(dir.path());

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.add(if i % 2 == 0 { "Race" } else { "race" }, ResponseKind::Text, "x", i)
                        .await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        assert_eq!(outcomes.iter().filter(|o| **o == AddOutcome::Created).count(), 1);
        assert_eq!(
            outcomes.iter().filter(|o| **o == AddOutcome::AlreadyExists).count(),
            5
        );
    }
}
