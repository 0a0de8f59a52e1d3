//! In-memory cache of who may run privileged operations.
//!
//! The cache mirrors the admin roster plus the configured super admin. It
//! starts empty, is filled by [`AuthorizationCache::load`], and is kept in
//! step by [`add`](AuthorizationCache::add) and
//! [`remove`](AuthorizationCache::remove). Store failures are logged and
//! reported as `false`, never raised.

use std::collections::HashSet;
use std::sync::Arc;

use learnbot_models::AdminRecord;
use learnbot_persistence::AdminStore;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Set of authorized user ids backed by an [`AdminStore`].
pub struct AuthorizationCache {
    store: Arc<dyn AdminStore>,
    super_admin: Option<i64>,
    admins: RwLock<HashSet<i64>>,
}

impl AuthorizationCache {
    pub fn new(store: Arc<dyn AdminStore>, super_admin: Option<i64>) -> Self {
        Self {
            store,
            super_admin,
            admins: RwLock::new(HashSet::new()),
        }
    }

    /// The configured super admin.
    pub fn super_admin(&self) -> Option<i64> {
        self.super_admin
    }

    /// Whether `user_id` is the configured super admin.
    pub fn is_super_admin(&self, user_id: i64) -> bool {
        self.super_admin == Some(user_id)
    }

    /// Replaces the cache with the stored roster plus the super admin.
    ///
    /// Returns `false` and leaves the cache as it was if the store fails.
    pub async fn load(&self) -> bool {
        let roster = match self.store.list().await {
            Ok(roster) => roster,
            Err(e) => {
                error!(error = %e, "Failed to load admin roster");
                return false;
            }
        };

        let mut set: HashSet<i64> = roster.iter().map(|r| r.user_id).collect();
        if let Some(id) = self.super_admin {
            set.insert(id);
        }
        let count = set.len();
        *self.admins.write().await = set;

        info!(admins = count, "Authorization cache loaded");
        true
    }

    /// Whether `user_id` may run privileged operations.
    pub async fn is_authorized(&self, user_id: i64) -> bool {
        if self.is_super_admin(user_id) {
            return true;
        }

        // A successful load always leaves the super admin in the set, so
        // this reload happens only until the first load succeeds.
        if self.super_admin.is_some() && self.admins.read().await.is_empty() {
            debug!("Authorization cache empty, reloading");
            self.load().await;
        }

        self.admins.read().await.contains(&user_id)
    }

    /// Grants admin rights. An id the store already holds counts as added.
    pub async fn add(&self, user_id: i64, added_by: i64) -> bool {
        match self.store.insert(AdminRecord::new(user_id, added_by)).await {
            Ok(()) => info!(user_id, added_by, "Admin added"),
            Err(e) if e.is_conflict() => debug!(user_id, "Admin already stored"),
            Err(e) => {
                error!(user_id, error = %e, "Failed to add admin");
                return false;
            }
        }
        self.admins.write().await.insert(user_id);
        true
    }

    /// Revokes admin rights. The super admin is refused without touching
    /// the store.
    pub async fn remove(&self, user_id: i64) -> bool {
        if self.is_super_admin(user_id) {
            warn!(user_id, "Refusing to remove the super admin");
            return false;
        }

        match self.store.remove(user_id).await {
            Ok(0) => {
                debug!(user_id, "Admin not in roster");
                false
            }
            Ok(_) => {
                self.admins.write().await.remove(&user_id);
                info!(user_id, "Admin removed");
                true
            }
            Err(e) => {
                error!(user_id, error = %e, "Failed to remove admin");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnbot_persistence::{PersistenceError, Result};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Roster in memory that counts calls and can be switched to failing.
    #[derive(Default)]
    struct MockAdminStore {
        rows: Mutex<Vec<AdminRecord>>,
        failing: AtomicBool,
        lists: AtomicUsize,
        removes: AtomicUsize,
    }

    impl MockAdminStore {
        fn with(ids: &[i64]) -> Self {
            let store = Self::default();
            *store.rows.lock().unwrap() = ids.iter().map(|id| AdminRecord::new(*id, 1)).collect();
            store
        }

        fn fail(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(PersistenceError::TaskFailed("store offline".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AdminStore for MockAdminStore {
        async fn insert(&self, record: AdminRecord) -> Result<()> {
            self.fail()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.user_id == record.user_id) {
                return Err(PersistenceError::Conflict {
                    kind: "admin".into(),
                    id: record.user_id.to_string(),
                });
            }
            rows.push(record);
            Ok(())
        }

        async fn remove(&self, user_id: i64) -> Result<usize> {
            self.removes.fetch_add(1, Ordering::SeqCst);
            self.fail()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.user_id != user_id);
            Ok(before - rows.len())
        }

        async fn list(&self) -> Result<Vec<AdminRecord>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.fail()?;
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    fn cache(store: &Arc<MockAdminStore>, super_admin: Option<i64>) -> AuthorizationCache {
        AuthorizationCache::new(store.clone(), super_admin)
    }

    #[tokio::test]
    async fn test_super_admin_always_authorized() {
        let store = Arc::new(MockAdminStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let auth = cache(&store, Some(1));

        assert!(auth.is_authorized(1).await);
        assert!(!auth.is_authorized(2).await);
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let store = Arc::new(MockAdminStore::with(&[10, 11]));
        let auth = cache(&store, Some(1));

        assert!(auth.load().await);
        let first = snapshot(&auth, &[1, 10, 11, 12]).await;
        assert!(auth.load().await);
        let second = snapshot(&auth, &[1, 10, 11, 12]).await;

        assert_eq!(first, vec![true, true, true, false]);
        assert_eq!(first, second);
    }

    async fn snapshot(auth: &AuthorizationCache, ids: &[i64]) -> Vec<bool> {
        let mut out = Vec::new();
        for id in ids {
            out.push(auth.is_authorized(*id).await);
        }
        out
    }

    #[tokio::test]
    async fn test_empty_cache_reloads_once() {
        let store = Arc::new(MockAdminStore::with(&[10]));
        let auth = cache(&store, Some(1));

        assert!(auth.is_authorized(10).await);
        assert!(!auth.is_authorized(99).await);
        assert!(auth.is_authorized(10).await);
        assert_eq!(store.lists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_reload_without_super_admin() {
        let store = Arc::new(MockAdminStore::with(&[10]));
        let auth = cache(&store, None);

        assert!(!auth.is_authorized(10).await);
        assert_eq!(store.lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_set() {
        let store = Arc::new(MockAdminStore::with(&[10]));
        let auth = cache(&store, None);
        assert!(auth.load().await);

        store.failing.store(true, Ordering::SeqCst);
        assert!(!auth.load().await);
        assert!(auth.is_authorized(10).await);
    }

    #[tokio::test]
    async fn test_add_and_duplicate_add() {
        let store = Arc::new(MockAdminStore::default());
        let auth = cache(&store, Some(1));
        auth.load().await;

        assert!(auth.add(5, 1).await);
        assert!(auth.is_authorized(5).await);
        assert!(auth.add(5, 1).await);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_failure_not_cached() {
        let store = Arc::new(MockAdminStore::default());
        let auth = cache(&store, Some(1));
        auth.load().await;
        store.failing.store(true, Ordering::SeqCst);

        assert!(!auth.add(5, 1).await);
        assert!(!auth.is_authorized(5).await);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = Arc::new(MockAdminStore::with(&[5]));
        let auth = cache(&store, Some(1));
        auth.load().await;

        assert!(auth.remove(5).await);
        assert!(!auth.is_authorized(5).await);
        assert!(!auth.remove(5).await);
    }

    #[tokio::test]
    async fn test_remove_super_admin_never_calls_store() {
        let store = Arc::new(MockAdminStore::default());
        let auth = cache(&store, Some(1));

        assert!(!auth.remove(1).await);
        assert!(auth.is_authorized(1).await);
        assert_eq!(store.removes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remove_failure_keeps_cache() {
        let store = Arc::new(MockAdminStore::with(&[5]));
        let auth = cache(&store, Some(1));
        auth.load().await;
        store.failing.store(true, Ordering::SeqCst);

        assert!(!auth.remove(5).await);
        assert!(auth.is_authorized(5).await);
    }
}
