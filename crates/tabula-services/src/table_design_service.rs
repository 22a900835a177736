//! Table design service
//!
//! Provides table structure operations on top of the designer:
//! - Opening edit sessions with a baseline from the schema cache
//! - Creating new tables
//! - Removing tables
//! - Generating statements for preview
//!
//! At most one live session exists per table. Losing the connection closes
//! every session and marks the whole cache stale.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tabula_core::{RefreshScope, SchemaSync, StatementExecutor};
use tabula_designer::{
    DdlCompiler, DesignerConfig, EditSession, SessionState, TableDefinition, preview_script,
};
use tabula_schema::{CacheSynchronizer, SchemaCache, SchemaLoader};

use crate::error::{ServiceError, ServiceResult};

/// Service for table design operations
///
/// Handles:
/// - Loading baselines from the cache, reloading stale entries on demand
/// - The registry of open edit sessions
/// - Table removal and connection loss
pub struct TableDesignService {
    executor: Arc<dyn StatementExecutor>,
    sync: Arc<CacheSynchronizer>,
    config: DesignerConfig,
    sessions: RwLock<HashMap<String, Arc<EditSession>>>,
}

impl TableDesignService {
    /// Create a new table design service with an empty cache
    pub fn new(
        executor: Arc<dyn StatementExecutor>,
        loader: Arc<dyn SchemaLoader>,
        config: DesignerConfig,
    ) -> Self {
        Self::with_cache(Arc::new(SchemaCache::default()), executor, loader, config)
    }

    /// Create a table design service over an existing cache
    pub fn with_cache(
        cache: Arc<SchemaCache>,
        executor: Arc<dyn StatementExecutor>,
        loader: Arc<dyn SchemaLoader>,
        config: DesignerConfig,
    ) -> Self {
        Self {
            executor,
            sync: Arc::new(CacheSynchronizer::new(cache, loader)),
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        self.sync.cache()
    }

    pub fn synchronizer(&self) -> &Arc<CacheSynchronizer> {
        &self.sync
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// The designer surface became active: refresh the whole schema.
    pub fn open_designer(&self) {
        tracing::debug!("designer opened, refreshing schema");
        self.sync.refresh(RefreshScope::All);
    }

    /// Reload every table now and return the table names
    #[tracing::instrument(skip(self))]
    pub async fn load_tables(&self) -> ServiceResult<Vec<String>> {
        self.sync
            .reload(RefreshScope::All)
            .await
            .map_err(|e| ServiceError::SchemaLoadFailed(e.to_string()))?;
        Ok(self.cache().table_names())
    }

    /// Live session editing `table`, if any
    pub fn session(&self, table: &str) -> Option<Arc<EditSession>> {
        self.sessions
            .read()
            .get(table)
            .filter(|session| session.state() != SessionState::Closed)
            .cloned()
    }

    /// Number of live sessions
    pub fn open_session_count(&self) -> usize {
        self.sessions
            .read()
            .values()
            .filter(|session| session.state() != SessionState::Closed)
            .count()
    }

    /// Open an edit session on an existing table.
    ///
    /// The baseline comes from the cache; a missing or stale entry is
    /// reloaded first.
    #[tracing::instrument(skip(self))]
    pub async fn open_session(&self, table: &str) -> ServiceResult<Arc<EditSession>> {
        self.ensure_no_session(table)?;

        if !self.cache().is_valid(table) {
            self.sync
                .reload(RefreshScope::table(table))
                .await
                .map_err(|e| ServiceError::SchemaLoadFailed(e.to_string()))?;
        }

        let baseline = self
            .cache()
            .get(table)
            .ok_or_else(|| ServiceError::TableNotFound(table.to_string()))?;

        let session = Arc::new(EditSession::open(
            baseline,
            self.executor.clone(),
            self.schema_sync(),
            &self.config,
        ));
        self.register(table, session.clone())?;
        Ok(session)
    }

    /// Open a session that creates a new table from `definition`
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name()))]
    pub fn create_table(&self, definition: TableDefinition) -> ServiceResult<Arc<EditSession>> {
        let table = definition.name().to_string();
        self.ensure_no_session(&table)?;
        if self.cache().contains(&table) {
            return Err(ServiceError::TableOperationFailed(format!(
                "table '{}' already exists",
                table
            )));
        }

        let session = Arc::new(EditSession::create(
            definition,
            self.executor.clone(),
            self.schema_sync(),
            &self.config,
        ));
        self.register(&table, session.clone())?;
        Ok(session)
    }

    /// Remove `table` from the backend.
    ///
    /// Goes through the table's live session when there is one, otherwise
    /// through a short-lived session on the cached definition.
    #[tracing::instrument(skip(self))]
    pub async fn remove_table(&self, table: &str) -> ServiceResult<()> {
        let session = match self.session(table) {
            Some(session) => session,
            None => {
                let baseline = self
                    .cache()
                    .get(table)
                    .unwrap_or_else(|| TableDefinition::new(table));
                Arc::new(EditSession::open(
                    baseline,
                    self.executor.clone(),
                    self.schema_sync(),
                    &self.config,
                ))
            }
        };

        session.remove_table().await?;
        self.sessions.write().remove(table);
        tracing::info!(table = %table, "table removed");
        Ok(())
    }

    /// The connection dropped: close every session and mark the cache stale
    pub fn connection_lost(&self) {
        let sessions: Vec<_> = self.sessions.write().drain().map(|(_, s)| s).collect();
        tracing::warn!(session_count = sessions.len(), "connection lost, invalidating sessions");
        for session in sessions {
            session.invalidate();
        }
        self.cache().mark_stale(&RefreshScope::All);
    }

    /// Statements moving `previous` to `next` under this service's options
    pub fn generate_statements(
        &self,
        previous: Option<&TableDefinition>,
        next: &TableDefinition,
    ) -> Vec<String> {
        DdlCompiler::with_options(self.config.compiler.clone()).compile(previous, next)
    }

    /// Script preview of [`generate_statements`](Self::generate_statements)
    pub fn preview(&self, previous: Option<&TableDefinition>, next: &TableDefinition) -> String {
        preview_script(&self.generate_statements(previous, next))
    }

    fn schema_sync(&self) -> Arc<dyn SchemaSync> {
        self.sync.clone()
    }

    fn ensure_no_session(&self, table: &str) -> ServiceResult<()> {
        if self.session(table).is_some() {
            return Err(ServiceError::SessionAlreadyOpen(table.to_string()));
        }
        Ok(())
    }

    /// Add `session` to the registry, dropping closed sessions on the way
    fn register(&self, table: &str, session: Arc<EditSession>) -> ServiceResult<()> {
        let mut sessions = self.sessions.write();
        sessions.retain(|_, existing| existing.state() != SessionState::Closed);
        if sessions.contains_key(table) {
            session.invalidate();
            return Err(ServiceError::SessionAlreadyOpen(table.to_string()));
        }
        tracing::debug!(table = %table, session_id = %session.id(), "session registered");
        sessions.insert(table.to_string(), session);
        Ok(())
    }
}
