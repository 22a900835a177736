//! Table definition model

use serde::{Deserialize, Serialize};

use super::{
    EventDefinition, FieldDefinition, FieldOrigin, IndexDefinition, TableSchema,
    ValidationError, ValidationPolicy,
};

/// Full definition of a table: the aggregate an edit session works on.
///
/// This is a plain value. Two definitions are the same when every attribute
/// and every child definition (in order) compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableDefinition {
    pub schema: TableSchema,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

impl TableDefinition {
    /// Create an empty definition for the named table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: TableSchema::new(name),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Whether this is an edge table
    pub fn is_edge(&self) -> bool {
        self.schema.kind.is_relation()
    }

    /// Builder: mark as schemafull
    pub fn schemafull(mut self) -> Self {
        self.schema.full = true;
        self
    }

    /// Builder: add a field
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Builder: add an index
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Builder: add an event
    pub fn with_event(mut self, event: EventDefinition) -> Self {
        self.events.push(event);
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name for editing
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDefinition> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Look up an index by name
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Look up an event by name
    pub fn event(&self, name: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Remove a field by name, returning it if present
    pub fn remove_field(&mut self, name: &str) -> Option<FieldDefinition> {
        let pos = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(pos))
    }

    /// Remove an index by name, returning it if present
    pub fn remove_index(&mut self, name: &str) -> Option<IndexDefinition> {
        let pos = self.indexes.iter().position(|i| i.name == name)?;
        Some(self.indexes.remove(pos))
    }

    /// Remove an event by name, returning it if present
    pub fn remove_event(&mut self, name: &str) -> Option<EventDefinition> {
        let pos = self.events.iter().position(|e| e.name == name)?;
        Some(self.events.remove(pos))
    }

    /// Mark every field that is not an untouched observed field of
    /// `baseline` as declared. An observed field edited back to what was
    /// observed becomes observed again.
    pub fn declare_edited_fields(&mut self, baseline: &TableDefinition) {
        for field in &mut self.fields {
            let untouched = baseline.field(&field.name).is_some_and(|old| {
                old.origin == FieldOrigin::Observed
                    && *old
                        == FieldDefinition {
                            origin: FieldOrigin::Observed,
                            ..field.clone()
                        }
            });
            field.origin = if untouched {
                FieldOrigin::Observed
            } else {
                FieldOrigin::Declared
            };
        }
    }

    /// Check the definition against the default policy
    pub fn validate(&self) -> Vec<ValidationError> {
        self.validate_with(&ValidationPolicy::default())
    }

    /// Check the definition against `policy`
    pub fn validate_with(&self, policy: &ValidationPolicy) -> Vec<ValidationError> {
        super::validation::validate(self, policy)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
