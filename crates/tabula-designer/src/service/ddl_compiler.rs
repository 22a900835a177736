//! Definition diff compiler
//!
//! Turns a (previous, next) pair of table definitions into the ordered batch
//! of `DEFINE`/`REMOVE` statements that moves the backend from one to the
//! other. The backend's `DEFINE` overwrites, so every changed object is
//! re-declared in full and unchanged objects produce nothing.
//!
//! Emission order:
//!
//! 1. `DEFINE TABLE` when any table-wide attribute differs (or the table is new)
//! 2. field removals, then field definitions
//! 3. index removals, then index definitions
//! 4. event removals, then event definitions
//!
//! Children are matched by name only. A rename therefore compiles to a
//! removal of the old name and a definition of the new one.

use indexmap::IndexMap;

use super::statement::DdlStatement;
use crate::config::{CompileOptions, ObservedFieldPolicy};
use crate::models::{EventDefinition, FieldDefinition, FieldOrigin, IndexDefinition, TableDefinition};

/// Child definitions keyed by name
trait Named {
    fn name(&self) -> &str;
}

impl Named for FieldDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for IndexDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for EventDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Key-based partition of one child collection
struct CollectionDiff<'a, T> {
    /// Present before, absent after
    removed: Vec<&'a T>,
    /// Absent before, or present on both sides with different content
    upserted: Vec<&'a T>,
}

/// Partition `previous` and `next` by name. The first entry wins when a
/// collection repeats a name.
fn diff_by_name<'a, T: Named + PartialEq>(previous: &'a [T], next: &'a [T]) -> CollectionDiff<'a, T> {
    let mut before: IndexMap<&str, &T> = IndexMap::new();
    for item in previous {
        before.entry(item.name()).or_insert(item);
    }

    let mut after: IndexMap<&str, &T> = IndexMap::new();
    for item in next {
        after.entry(item.name()).or_insert(item);
    }

    let removed = before
        .iter()
        .filter(|(name, _)| !after.contains_key(*name))
        .map(|(_, item)| *item)
        .collect();

    let upserted = after
        .iter()
        .filter(|(name, item)| before.get(*name).is_none_or(|old| old != *item))
        .map(|(_, item)| *item)
        .collect();

    CollectionDiff { removed, upserted }
}

/// Compiles definition diffs into definition statements
#[derive(Debug, Clone, Default)]
pub struct DdlCompiler {
    options: CompileOptions,
}

impl DdlCompiler {
    /// Creates a compiler with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler with the given options
    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Whether dropping `field` from a table of the given mode is left out of
    /// the batch. Observed fields disappear along with their records.
    fn skips_removal(&self, field: &FieldDefinition, schemafull: bool) -> bool {
        !schemafull
            && field.origin == FieldOrigin::Observed
            && self.options.observed_fields == ObservedFieldPolicy::Skip
    }

    /// `field` as the compiler compares it. Origin is not compared: an
    /// observed field the user changed is defined like any other.
    fn comparable(field: &FieldDefinition, schemafull: bool) -> FieldDefinition {
        let mut field = field.normalized_for(schemafull);
        field.origin = FieldOrigin::Declared;
        field
    }

    /// Produce the typed statement plan moving `previous` to `next`.
    ///
    /// `previous` is `None` for a table that does not exist yet.
    pub fn plan(
        &self,
        previous: Option<&TableDefinition>,
        next: &TableDefinition,
    ) -> Vec<DdlStatement> {
        let table = next.schema.name.clone();
        let if_exists = self.options.remove_if_exists;
        let mut statements = Vec::new();

        if previous.is_none_or(|prev| prev.schema.normalized() != next.schema.normalized()) {
            statements.push(DdlStatement::DefineTable {
                schema: next.schema.clone(),
            });
        }

        let next_fields: Vec<FieldDefinition> = next
            .fields
            .iter()
            .map(|field| Self::comparable(field, next.schema.full))
            .collect();
        let previous_fields: Vec<FieldDefinition> = previous
            .map(|prev| {
                prev.fields
                    .iter()
                    .filter(|field| {
                        next.field(&field.name).is_some()
                            || !self.skips_removal(field, prev.schema.full)
                    })
                    .map(|field| Self::comparable(field, prev.schema.full))
                    .collect()
            })
            .unwrap_or_default();
        let fields = diff_by_name(&previous_fields, &next_fields);
        statements.extend(fields.removed.into_iter().map(|field| DdlStatement::RemoveField {
            table: table.clone(),
            name: field.name.clone(),
            if_exists,
        }));
        statements.extend(fields.upserted.into_iter().map(|field| DdlStatement::DefineField {
            table: table.clone(),
            field: field.clone(),
        }));

        let previous_indexes = previous.map(|prev| prev.indexes.as_slice()).unwrap_or(&[]);
        let indexes = diff_by_name(previous_indexes, &next.indexes);
        statements.extend(indexes.removed.into_iter().map(|index| DdlStatement::RemoveIndex {
            table: table.clone(),
            name: index.name.clone(),
            if_exists,
        }));
        statements.extend(indexes.upserted.into_iter().map(|index| DdlStatement::DefineIndex {
            table: table.clone(),
            index: index.clone(),
        }));

        let previous_events = previous.map(|prev| prev.events.as_slice()).unwrap_or(&[]);
        let events = diff_by_name(previous_events, &next.events);
        statements.extend(events.removed.into_iter().map(|event| DdlStatement::RemoveEvent {
            table: table.clone(),
            name: event.name.clone(),
            if_exists,
        }));
        statements.extend(events.upserted.into_iter().map(|event| DdlStatement::DefineEvent {
            table: table.clone(),
            event: event.clone(),
        }));

        tracing::debug!(
            table = %table,
            is_new = previous.is_none(),
            statement_count = statements.len(),
            "compiled definition diff"
        );

        statements
    }

    /// Compile the diff between `previous` and `next` to statement text
    pub fn compile(&self, previous: Option<&TableDefinition>, next: &TableDefinition) -> Vec<String> {
        let statements: Vec<String> = self
            .plan(previous, next)
            .iter()
            .map(|statement| statement.to_string())
            .collect();

        for statement in &statements {
            tracing::trace!(%statement, "compiled statement");
        }

        statements
    }

    /// Statement removing a whole table. The diff is not involved.
    pub fn remove_table(&self, table: impl Into<String>) -> DdlStatement {
        DdlStatement::RemoveTable {
            table: table.into(),
            if_exists: self.options.remove_table_if_exists,
        }
    }
}

/// Compile with default options
pub fn compile(previous: &TableDefinition, next: &TableDefinition) -> Vec<String> {
    DdlCompiler::new().compile(Some(previous), next)
}

/// Join a batch into a single script, the way it is shown in a preview
pub fn preview_script(statements: &[String]) -> String {
    if statements.is_empty() {
        return String::new();
    }
    let mut script = statements.join(";\n");
    script.push(';');
    script
}

#[cfg(test)]
#[path = "ddl_compiler_tests.rs"]
mod tests;
