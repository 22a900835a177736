//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tabula_core::{RefreshScope, Result, StatementExecutor, StatementOutcome, TabulaError};
use tabula_designer::{FieldDefinition, IndexDefinition, TableDefinition};
use tabula_schema::SchemaLoader;

/// Mock executor for testing service-layer logic without a backend.
///
/// Answers each batch with the next scripted reply, or with all successes
/// when nothing is scripted. Every batch is logged for assertions.
#[derive(Default)]
pub struct MockExecutor {
    pub should_fail: bool,
    replies: Mutex<VecDeque<Vec<StatementOutcome>>>,
    batch_log: Mutex<Vec<Vec<String>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Queue the outcomes for the next batch
    pub fn reply(&self, outcomes: Vec<StatementOutcome>) {
        self.replies.lock().push_back(outcomes);
    }

    pub fn batch_log(&self) -> Vec<Vec<String>> {
        self.batch_log.lock().clone()
    }

    /// Every statement executed, flattened
    pub fn statements(&self) -> Vec<String> {
        self.batch_log.lock().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl StatementExecutor for MockExecutor {
    async fn execute(&self, statements: &[String]) -> Result<Vec<StatementOutcome>> {
        self.batch_log.lock().push(statements.to_vec());

        if self.should_fail {
            return Err(TabulaError::Connection("connection reset".into()));
        }

        Ok(self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| vec![StatementOutcome::Success; statements.len()]))
    }
}

/// Mock loader serving table definitions from memory
#[derive(Default)]
pub struct MockLoader {
    pub should_fail: bool,
    tables: Mutex<BTreeMap<String, TableDefinition>>,
    scopes: Mutex<Vec<RefreshScope>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, definition: TableDefinition) -> Self {
        self.put(definition);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Replace a table as the backend now reports it
    pub fn put(&self, definition: TableDefinition) {
        self.tables
            .lock()
            .insert(definition.name().to_string(), definition);
    }

    pub fn drop_table(&self, name: &str) {
        self.tables.lock().remove(name);
    }

    /// Scopes of every load so far
    pub fn scopes(&self) -> Vec<RefreshScope> {
        self.scopes.lock().clone()
    }
}

#[async_trait]
impl SchemaLoader for MockLoader {
    async fn load_tables(&self, scope: &RefreshScope) -> Result<Vec<TableDefinition>> {
        self.scopes.lock().push(scope.clone());

        if self.should_fail {
            return Err(TabulaError::Connection("connection reset".into()));
        }

        Ok(self
            .tables
            .lock()
            .values()
            .filter(|definition| scope.covers(definition.name()))
            .cloned()
            .collect())
    }
}

/// `person` table with one field and one index
pub fn person_table() -> TableDefinition {
    TableDefinition::new("person")
        .schemafull()
        .with_field(FieldDefinition::named("age").kind("int"))
        .with_index(IndexDefinition::named("age_idx").field("age"))
}

/// Executor and loader pair shared with a service under test
pub fn backend(tables: Vec<TableDefinition>) -> (Arc<MockExecutor>, Arc<MockLoader>) {
    let loader = MockLoader::new();
    for table in tables {
        loader.put(table);
    }
    (Arc::new(MockExecutor::new()), Arc::new(loader))
}
