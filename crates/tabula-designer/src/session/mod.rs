//! Edit session state machine
//!
//! An [`EditSession`] owns one in-flight edit of a table: the baseline last
//! confirmed by the backend, the draft being edited, and the errors of the
//! last failed save.
//!
//! ```text
//!            edit (differs)              save ok
//!   Clean ------------------> Dirty ----> Saving ------> Clean
//!     ^   <-- edit (equal) --   |           |
//!     |                         |           | rejected / transport failure
//!     +------- revert ----------+           v
//!     +------- revert ------------------- Error  (editable, save retries)
//!
//!   close: Clean only     discard: any but Saving     invalidate: any
//! ```
//!
//! `save` is the only suspending operation. The session lock is never held
//! while the executor runs, so invalidation can close the session mid-save;
//! the late result is then dropped.

use std::fmt;
use std::sync::Arc;

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use parking_lot::Mutex;
use tabula_core::{
    RefreshScope, SchemaSync, StatementExecutor, StatementOutcome, strip_error_prefix,
};
use uuid::Uuid;

use crate::config::DesignerConfig;
use crate::error::{DesignerError, DesignerResult};
use crate::events::SessionEvent;
use crate::models::{TableDefinition, ValidationError, ValidationPolicy};
use crate::service::{DdlCompiler, DdlStatement, preview_script};

/// Lifecycle state of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Draft equals the baseline and there are no errors
    Clean,
    /// Draft differs from the baseline
    Dirty,
    /// A batch is in flight; the draft is frozen
    Saving,
    /// The last save failed; the draft is retained and still editable
    Error,
    /// No further operations are accepted
    Closed,
}

impl SessionState {
    /// Whether the draft may be edited in this state
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            SessionState::Clean | SessionState::Dirty | SessionState::Error
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Clean => "clean",
            SessionState::Dirty => "dirty",
            SessionState::Saving => "saving",
            SessionState::Error => "in error",
            SessionState::Closed => "closed",
        })
    }
}

/// Operations guarded by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOperation {
    Edit,
    Save,
    Revert,
    Close,
    Discard,
    RemoveTable,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionOperation::Edit => "edit",
            SessionOperation::Save => "save",
            SessionOperation::Revert => "revert",
            SessionOperation::Close => "close",
            SessionOperation::Discard => "discard",
            SessionOperation::RemoveTable => "remove the table",
        })
    }
}

/// Badge shown next to the save action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing to save
    Unchanged,
    /// Unsaved changes that pass validation
    Saveable,
    /// Unsaved changes with missing or conflicting attributes
    Invalid,
}

struct SessionInner {
    baseline: TableDefinition,
    draft: TableDefinition,
    /// Whether the baseline exists on the backend
    exists: bool,
    state: SessionState,
    errors: Vec<String>,
    subscribers: Vec<UnboundedSender<SessionEvent>>,
}

impl SessionInner {
    fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    fn transition(&mut self, session_id: Uuid, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(%session_id, table = %self.draft.name(), %from, %to, "session state changed");
        self.emit(SessionEvent::StateChanged {
            session_id,
            from,
            to,
        });
        if to == SessionState::Closed {
            self.emit(SessionEvent::Closed { session_id });
            self.subscribers.clear();
        }
    }

    /// Clean or Dirty, judged by value equality against the baseline
    fn settled_state(&self) -> SessionState {
        if self.exists && self.draft == self.baseline {
            SessionState::Clean
        } else {
            SessionState::Dirty
        }
    }

    fn require(
        &self,
        operation: SessionOperation,
        allowed: &[SessionState],
    ) -> DesignerResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(DesignerError::SessionMisuse {
                operation,
                state: self.state,
            })
        }
    }
}

/// One in-flight edit of a table definition
pub struct EditSession {
    id: Uuid,
    executor: Arc<dyn StatementExecutor>,
    sync: Arc<dyn SchemaSync>,
    compiler: DdlCompiler,
    validation: ValidationPolicy,
    error_prefix: String,
    inner: Mutex<SessionInner>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("table", &inner.baseline.name())
            .field("state", &inner.state)
            .finish()
    }
}

impl EditSession {
    /// Open a session on a table that exists on the backend.
    ///
    /// `baseline` is the definition as last loaded from the schema cache.
    pub fn open(
        baseline: TableDefinition,
        executor: Arc<dyn StatementExecutor>,
        sync: Arc<dyn SchemaSync>,
        config: &DesignerConfig,
    ) -> Self {
        Self::with_baseline(baseline, true, executor, sync, config)
    }

    /// Open a session creating a new table from `draft`.
    ///
    /// The session starts dirty and the first save defines the table.
    pub fn create(
        draft: TableDefinition,
        executor: Arc<dyn StatementExecutor>,
        sync: Arc<dyn SchemaSync>,
        config: &DesignerConfig,
    ) -> Self {
        Self::with_baseline(draft, false, executor, sync, config)
    }

    fn with_baseline(
        baseline: TableDefinition,
        exists: bool,
        executor: Arc<dyn StatementExecutor>,
        sync: Arc<dyn SchemaSync>,
        config: &DesignerConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        let state = if exists {
            SessionState::Clean
        } else {
            SessionState::Dirty
        };
        tracing::info!(session_id = %id, table = %baseline.name(), exists, "edit session opened");

        Self {
            id,
            executor,
            sync,
            compiler: DdlCompiler::with_options(config.compiler.clone()),
            validation: config.validation.clone(),
            error_prefix: config.error_prefix.clone(),
            inner: Mutex::new(SessionInner {
                draft: baseline.clone(),
                baseline,
                exists,
                state,
                errors: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the table the session targets
    pub fn table_name(&self) -> String {
        self.inner.lock().baseline.name().to_string()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Whether the table has not been defined on the backend yet
    pub fn is_new(&self) -> bool {
        !self.inner.lock().exists
    }

    pub fn draft(&self) -> TableDefinition {
        self.inner.lock().draft.clone()
    }

    pub fn baseline(&self) -> TableDefinition {
        self.inner.lock().baseline.clone()
    }

    /// Messages of the last failed save
    pub fn errors(&self) -> Vec<String> {
        self.inner.lock().errors.clone()
    }

    /// Validation violations of the current draft
    pub fn violations(&self) -> Vec<ValidationError> {
        self.inner.lock().draft.validate_with(&self.validation)
    }

    pub fn save_status(&self) -> SaveStatus {
        let inner = self.inner.lock();
        if inner.settled_state() == SessionState::Clean {
            SaveStatus::Unchanged
        } else if inner.draft.validate_with(&self.validation).is_empty() {
            SaveStatus::Saveable
        } else {
            SaveStatus::Invalid
        }
    }

    /// Statements the next save would send
    pub fn pending_statements(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let previous = inner.exists.then_some(&inner.baseline);
        self.compiler.compile(previous, &inner.draft)
    }

    /// The pending statements as one script
    pub fn preview_script(&self) -> String {
        preview_script(&self.pending_statements())
    }

    /// Receive an event for every transition from now on
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Apply `change` to the draft and return the resulting state.
    ///
    /// Refused while saving or closed. On an existing table the name cannot
    /// change; such an edit is rejected and the draft is left as it was.
    pub fn edit(&self, change: impl FnOnce(&mut TableDefinition)) -> DesignerResult<SessionState> {
        let mut inner = self.inner.lock();
        inner.require(
            SessionOperation::Edit,
            &[SessionState::Clean, SessionState::Dirty, SessionState::Error],
        )?;

        let mut draft = inner.draft.clone();
        change(&mut draft);

        if inner.exists && draft.name() != inner.baseline.name() {
            return Err(DesignerError::ImmutableName {
                current: inner.baseline.name().to_string(),
                requested: draft.name().to_string(),
            });
        }

        draft.declare_edited_fields(&inner.baseline);
        inner.draft = draft;
        let next = match inner.settled_state() {
            SessionState::Clean => {
                inner.errors.clear();
                SessionState::Clean
            }
            _ if inner.state == SessionState::Error => SessionState::Error,
            settled => settled,
        };
        inner.transition(self.id, next);
        Ok(next)
    }

    /// Replace the whole draft
    pub fn set_draft(&self, draft: TableDefinition) -> DesignerResult<SessionState> {
        self.edit(move |current| *current = draft)
    }

    /// Compile the draft against the baseline and apply it as one batch.
    ///
    /// Allowed from `Dirty` or `Error` with a valid draft. On success the
    /// baseline advances and the schema cache is refreshed for the table. On
    /// failure the draft and baseline stay as they were and the session
    /// enters `Error`.
    #[tracing::instrument(skip(self), fields(session_id = %self.id))]
    pub async fn save(&self) -> DesignerResult<()> {
        let (statements, table) = {
            let mut inner = self.inner.lock();
            inner.require(
                SessionOperation::Save,
                &[SessionState::Dirty, SessionState::Error],
            )?;

            let violations = inner.draft.validate_with(&self.validation);
            if !violations.is_empty() {
                tracing::debug!(count = violations.len(), "save refused by validation");
                return Err(DesignerError::Validation(violations));
            }

            let previous = inner.exists.then_some(&inner.baseline);
            let statements = self.compiler.compile(previous, &inner.draft);
            let table = inner.draft.name().to_string();
            inner.transition(self.id, SessionState::Saving);
            (statements, table)
        };

        if statements.is_empty() {
            let mut inner = self.inner.lock();
            self.commit(&mut inner, &table, 0);
            return Ok(());
        }

        tracing::debug!(table = %table, count = statements.len(), "sending statement batch");
        let result = self.executor.execute(&statements).await;
        let outcome = self.fold_outcomes(statements.len(), result);

        let mut inner = self.inner.lock();
        if inner.state != SessionState::Saving {
            tracing::debug!(table = %table, state = %inner.state, "session closed during save, dropping result");
            if outcome.is_ok() {
                self.sync.refresh(RefreshScope::table(&table));
            }
            return outcome;
        }

        match outcome {
            Ok(()) => {
                self.commit(&mut inner, &table, statements.len());
                Ok(())
            }
            Err(err) => {
                self.fail(&mut inner, &err);
                Err(err)
            }
        }
    }

    /// Throw the draft away and return to the baseline
    pub fn revert(&self) -> DesignerResult<()> {
        let mut inner = self.inner.lock();
        inner.require(
            SessionOperation::Revert,
            &[SessionState::Dirty, SessionState::Error],
        )?;

        inner.draft = inner.baseline.clone();
        inner.errors.clear();
        let next = inner.settled_state();
        inner.transition(self.id, next);
        Ok(())
    }

    /// Close a session with nothing unsaved
    pub fn close(&self) -> DesignerResult<()> {
        let mut inner = self.inner.lock();
        inner.require(SessionOperation::Close, &[SessionState::Clean])?;
        self.shut(&mut inner, "closed");
        Ok(())
    }

    /// Close the session, dropping any unsaved changes
    pub fn discard(&self) -> DesignerResult<()> {
        let mut inner = self.inner.lock();
        inner.require(
            SessionOperation::Discard,
            &[SessionState::Clean, SessionState::Dirty, SessionState::Error],
        )?;
        self.shut(&mut inner, "discarded");
        Ok(())
    }

    /// Close the session regardless of its state, e.g. after the connection
    /// was lost. A save in flight has its result dropped.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Closed {
            self.shut(&mut inner, "invalidated");
        }
    }

    /// Remove the whole table from the backend.
    ///
    /// The diff is bypassed: a single `REMOVE TABLE` statement is sent. On
    /// success the session closes and the table's cache entry is refreshed.
    #[tracing::instrument(skip(self), fields(session_id = %self.id))]
    pub async fn remove_table(&self) -> DesignerResult<()> {
        let (statement, table) = {
            let mut inner = self.inner.lock();
            inner.require(
                SessionOperation::RemoveTable,
                &[SessionState::Clean, SessionState::Dirty, SessionState::Error],
            )?;
            let table = inner.baseline.name().to_string();
            inner.transition(self.id, SessionState::Saving);
            (self.removal_statement(&table), table)
        };

        let statements = vec![statement.to_string()];
        let result = self.executor.execute(&statements).await;
        let outcome = self.fold_outcomes(1, result);

        let mut inner = self.inner.lock();
        match outcome {
            Ok(()) => {
                tracing::info!(table = %table, "table removed");
                if inner.state == SessionState::Saving {
                    inner.exists = false;
                    self.shut(&mut inner, "table removed");
                }
                self.sync.refresh(RefreshScope::table(&table));
                Ok(())
            }
            Err(err) => {
                if inner.state == SessionState::Saving {
                    self.fail(&mut inner, &err);
                }
                Err(err)
            }
        }
    }

    fn removal_statement(&self, table: &str) -> DdlStatement {
        self.compiler.remove_table(table)
    }

    /// Turn executor output into a single result, stripping the backend's
    /// prefix from every failure message.
    fn fold_outcomes(
        &self,
        expected: usize,
        result: tabula_core::Result<Vec<StatementOutcome>>,
    ) -> DesignerResult<()> {
        let outcomes = result.map_err(|e| DesignerError::Transport(e.to_string()))?;

        if outcomes.len() != expected {
            return Err(DesignerError::Transport(format!(
                "expected {} statement results, received {}",
                expected,
                outcomes.len()
            )));
        }

        let messages: Vec<String> = outcomes
            .iter()
            .filter_map(StatementOutcome::message)
            .map(|message| strip_error_prefix(message, &self.error_prefix))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(DesignerError::StatementsRejected(messages))
        }
    }

    fn commit(&self, inner: &mut SessionInner, table: &str, statement_count: usize) {
        inner.baseline = inner.draft.clone();
        inner.exists = true;
        inner.errors.clear();
        inner.transition(self.id, SessionState::Clean);
        inner.emit(SessionEvent::Saved {
            session_id: self.id,
            table: table.to_string(),
            statement_count,
        });
        tracing::info!(session_id = %self.id, table, statement_count, "definition saved");
        if statement_count > 0 {
            self.sync.refresh(RefreshScope::table(table));
        }
    }

    fn fail(&self, inner: &mut SessionInner, err: &DesignerError) {
        let messages = err.messages();
        tracing::warn!(session_id = %self.id, table = %inner.draft.name(), ?messages, "save failed");
        inner.errors = messages.clone();
        inner.transition(self.id, SessionState::Error);
        inner.emit(SessionEvent::SaveFailed {
            session_id: self.id,
            messages,
        });
    }

    fn shut(&self, inner: &mut SessionInner, reason: &str) {
        inner.draft = inner.baseline.clone();
        inner.errors.clear();
        tracing::info!(session_id = %self.id, table = %inner.baseline.name(), reason, "edit session closed");
        inner.transition(self.id, SessionState::Closed);
    }
}
