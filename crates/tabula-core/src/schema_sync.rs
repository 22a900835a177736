//! Schema cache synchronization contract

use std::collections::BTreeSet;

/// Which part of the cached schema should be reloaded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefreshScope {
    /// Reload every table
    #[default]
    All,
    /// Reload only the named tables
    Tables(BTreeSet<String>),
}

impl RefreshScope {
    /// Scope covering a single table
    pub fn table(name: impl Into<String>) -> Self {
        RefreshScope::Tables(BTreeSet::from([name.into()]))
    }

    /// Whether `table` falls inside this scope
    pub fn covers(&self, table: &str) -> bool {
        match self {
            RefreshScope::All => true,
            RefreshScope::Tables(tables) => tables.contains(table),
        }
    }
}

/// Keeps the application's table-list cache consistent with the backend.
///
/// Calls are fire-and-forget: the caller never waits on the reload and a
/// failed reload is the synchronizer's own concern.
pub trait SchemaSync: Send + Sync {
    /// Request a reload of the tables in `scope`
    fn refresh(&self, scope: RefreshScope);
}
