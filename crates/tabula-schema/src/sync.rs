//! Cache-backed schema synchronizer
//!
//! [`CacheSynchronizer`] is the [`SchemaSync`] handed to edit sessions. A
//! refresh request marks the covered cache entries stale right away and,
//! when running inside a tokio runtime, reloads them in the background
//! through a [`SchemaLoader`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tabula_core::{RefreshScope, SchemaSync};
use tabula_designer::TableDefinition;
use tokio::task::JoinHandle;

use crate::cache::SchemaCache;

/// Reads table definitions from the backend
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    /// Load the definitions of every existing table in `scope`
    async fn load_tables(&self, scope: &RefreshScope) -> tabula_core::Result<Vec<TableDefinition>>;
}

/// Keeps a [`SchemaCache`] in step with the backend
pub struct CacheSynchronizer {
    cache: Arc<SchemaCache>,
    loader: Arc<dyn SchemaLoader>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheSynchronizer {
    pub fn new(cache: Arc<SchemaCache>, loader: Arc<dyn SchemaLoader>) -> Self {
        Self {
            cache,
            loader,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Load `scope` from the backend and store the result.
    ///
    /// On failure the entries stay stale and the error is returned.
    #[tracing::instrument(skip(self))]
    pub async fn reload(&self, scope: RefreshScope) -> tabula_core::Result<()> {
        reload_into(&self.cache, self.loader.as_ref(), &scope).await
    }

    /// Wait for every background reload started so far
    pub async fn flush(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "background schema reload panicked");
            }
        }
    }
}

async fn reload_into(
    cache: &SchemaCache,
    loader: &dyn SchemaLoader,
    scope: &RefreshScope,
) -> tabula_core::Result<()> {
    match loader.load_tables(scope).await {
        Ok(definitions) => {
            cache.apply_reload(scope, definitions);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(?scope, error = %e, "schema reload failed");
            Err(e)
        }
    }
}

impl SchemaSync for CacheSynchronizer {
    fn refresh(&self, scope: RefreshScope) {
        let marked = self.cache.mark_stale(&scope);
        tracing::debug!(?scope, marked, "schema refresh requested");

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime available, leaving entries stale");
            return;
        };

        let cache = self.cache.clone();
        let loader = self.loader.clone();
        let handle = runtime.spawn(async move {
            let _ = reload_into(&cache, loader.as_ref(), &scope).await;
        });

        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::TabulaError;

    /// Loader serving a fixed set of tables
    struct FixedLoader {
        tables: Vec<TableDefinition>,
        fail: bool,
    }

    #[async_trait]
    impl SchemaLoader for FixedLoader {
        async fn load_tables(
            &self,
            scope: &RefreshScope,
        ) -> tabula_core::Result<Vec<TableDefinition>> {
            if self.fail {
                return Err(TabulaError::Connection("offline".into()));
            }
            Ok(self
                .tables
                .iter()
                .filter(|def| scope.covers(def.name()))
                .cloned()
                .collect())
        }
    }

    fn synchronizer(tables: &[&str], fail: bool) -> CacheSynchronizer {
        let loader = FixedLoader {
            tables: tables.iter().map(|name| TableDefinition::new(*name)).collect(),
            fail,
        };
        CacheSynchronizer::new(Arc::new(SchemaCache::default()), Arc::new(loader))
    }

    #[tokio::test]
    async fn test_refresh_reloads_in_background() {
        let sync = synchronizer(&["person", "post"], false);

        sync.refresh(RefreshScope::All);
        sync.flush().await;

        assert_eq!(sync.cache().table_names(), vec!["person", "post"]);
        assert!(sync.cache().stale_tables().is_empty());
    }

    #[tokio::test]
    async fn test_scoped_refresh_drops_removed_table() {
        let sync = synchronizer(&["post"], false);
        sync.cache().set_table(TableDefinition::new("person"));
        sync.cache().set_table(TableDefinition::new("post"));

        sync.refresh(RefreshScope::table("person"));
        sync.flush().await;

        assert_eq!(sync.cache().table_names(), vec!["post"]);
    }

    #[tokio::test]
    async fn test_failed_reload_leaves_entries_stale() {
        let sync = synchronizer(&[], true);
        sync.cache().set_table(TableDefinition::new("person"));

        assert!(sync.reload(RefreshScope::All).await.is_err());

        sync.refresh(RefreshScope::All);
        sync.flush().await;
        assert_eq!(sync.cache().stale_tables(), vec!["person"]);
    }

    #[test]
    fn test_refresh_without_runtime_only_marks_stale() {
        let sync = synchronizer(&["person"], false);
        sync.cache().set_table(TableDefinition::new("person"));

        sync.refresh(RefreshScope::table("person"));

        assert_eq!(sync.cache().stale_tables(), vec!["person"]);
    }
}
