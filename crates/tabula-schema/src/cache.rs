//! Authoritative in-memory cache of table definitions
//!
//! Holds the last definition loaded from the backend for every table. Edit
//! sessions take their baseline from here. Entries are marked stale when a
//! refresh is requested and replaced when the reload lands.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tabula_core::RefreshScope;
use tabula_designer::TableDefinition;

/// Cached definition of a single table
#[derive(Debug, Clone)]
struct CachedTable {
    definition: TableDefinition,
    cached_at: Instant,
    /// A refresh covering this table was requested and has not landed yet
    stale: bool,
}

impl CachedTable {
    fn new(definition: TableDefinition) -> Self {
        Self {
            definition,
            cached_at: Instant::now(),
            stale: false,
        }
    }
}

/// Schema cache for one backend
pub struct SchemaCache {
    tables: RwLock<HashMap<String, CachedTable>>,

    /// Cache TTL
    ttl: Duration,
}

impl SchemaCache {
    /// Create a new schema cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Whether `table` is cached, fresh and within the TTL
    pub fn is_valid(&self, table: &str) -> bool {
        tracing::trace!(table = %table, "checking cache validity");
        self.tables
            .read()
            .get(table)
            .is_some_and(|cached| !cached.stale && cached.cached_at.elapsed() < self.ttl)
    }

    /// Get the cached definition of a table
    pub fn get(&self, table: &str) -> Option<TableDefinition> {
        let result = self
            .tables
            .read()
            .get(table)
            .map(|cached| cached.definition.clone());
        if result.is_some() {
            tracing::debug!(table = %table, "cache hit for table");
        } else {
            tracing::debug!(table = %table, "cache miss for table");
        }
        result
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    /// Names of every cached table, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of every table waiting for a reload, sorted
    pub fn stale_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .iter()
            .filter(|(_, cached)| cached.stale)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    /// Store a single table definition
    pub fn set_table(&self, definition: TableDefinition) {
        tracing::debug!(table = %definition.name(), "caching table definition");
        self.tables
            .write()
            .insert(definition.name().to_string(), CachedTable::new(definition));
    }

    /// Store the result of a reload covering `scope`.
    ///
    /// Tables in scope that the reload did not return no longer exist and are
    /// dropped. Tables outside the scope are left alone.
    pub fn apply_reload(&self, scope: &RefreshScope, definitions: Vec<TableDefinition>) {
        tracing::debug!(?scope, table_count = definitions.len(), "applying schema reload");
        let mut tables = self.tables.write();
        tables.retain(|name, _| !scope.covers(name));
        for definition in definitions {
            if scope.covers(definition.name()) {
                tables.insert(definition.name().to_string(), CachedTable::new(definition));
            }
        }
    }

    /// Flag every cached table in `scope` as needing a reload
    pub fn mark_stale(&self, scope: &RefreshScope) -> usize {
        let mut count = 0;
        for (name, cached) in self.tables.write().iter_mut() {
            if scope.covers(name) {
                cached.stale = true;
                count += 1;
            }
        }
        tracing::debug!(?scope, count, "marked cached tables stale");
        count
    }

    /// Drop a single table from the cache
    pub fn remove(&self, table: &str) -> Option<TableDefinition> {
        tracing::debug!(table = %table, "removing table from cache");
        self.tables.write().remove(table).map(|cached| cached.definition)
    }

    /// Clear the cache
    pub fn clear(&self) {
        let count = self.tables.read().len();
        tracing::info!(cache_entries = count, "clearing schema cache");
        self.tables.write().clear();
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300)) // 5 minute TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn cache_with(names: &[&str]) -> SchemaCache {
        let cache = SchemaCache::default();
        for name in names {
            cache.set_table(TableDefinition::new(*name));
        }
        cache
    }

    #[test]
    fn test_get_and_names() {
        let cache = cache_with(&["post", "person"]);

        assert_eq!(cache.table_names(), vec!["person", "post"]);
        assert_eq!(cache.get("person"), Some(TableDefinition::new("person")));
        assert!(cache.get("missing").is_none());
        assert!(cache.is_valid("person"));
    }

    #[test]
    fn test_mark_stale_follows_scope() {
        let cache = cache_with(&["person", "post"]);

        assert_eq!(cache.mark_stale(&RefreshScope::table("person")), 1);
        assert_eq!(cache.stale_tables(), vec!["person"]);
        assert!(!cache.is_valid("person"));
        assert!(cache.is_valid("post"));

        assert_eq!(cache.mark_stale(&RefreshScope::All), 2);
        assert_eq!(cache.stale_tables(), vec!["person", "post"]);
    }

    #[test]
    fn test_scoped_reload_drops_removed_tables_only_in_scope() {
        let cache = cache_with(&["person", "post"]);
        cache.mark_stale(&RefreshScope::All);

        cache.apply_reload(&RefreshScope::table("person"), vec![]);

        assert_eq!(cache.table_names(), vec!["post"]);
        assert_eq!(cache.stale_tables(), vec!["post"]);
    }

    #[test]
    fn test_full_reload_replaces_everything() {
        let cache = cache_with(&["person", "post"]);

        cache.apply_reload(
            &RefreshScope::All,
            vec![TableDefinition::new("likes"), TableDefinition::new("person")],
        );

        assert_eq!(cache.table_names(), vec!["likes", "person"]);
        assert!(cache.stale_tables().is_empty());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = SchemaCache::new(Duration::from_millis(10));
        cache.set_table(TableDefinition::new("person"));
        assert!(cache.is_valid("person"));

        thread::sleep(Duration::from_millis(20));
        assert!(!cache.is_valid("person"));
        assert!(cache.get("person").is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = cache_with(&["person", "post"]);

        assert!(cache.remove("person").is_some());
        assert!(!cache.contains("person"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
