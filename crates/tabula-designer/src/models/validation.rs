//! Validation types and logic
//!
//! Validation is advisory: it decides whether the save action is offered.
//! A definition that passes here can still be rejected by the backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{IndexKind, TableDefinition, TableKind};

/// Validation error for a table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path of the attribute that has the error
    pub field: String,
    /// Error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Policy switches for validation rules that depend on the deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Relation tables must name both an `in` and an `out` table
    pub require_relation_endpoints: bool,
}

/// Report empty and duplicate names within one child collection
fn check_names<'a>(
    errors: &mut Vec<ValidationError>,
    collection: &str,
    label: &str,
    names: impl Iterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    for (i, name) in names.enumerate() {
        if name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}[{}].name", collection, i),
                format!("{} {} name is required", label, i + 1),
            ));
        } else if !seen.insert(name) {
            errors.push(ValidationError::new(
                collection,
                format!("Duplicate {} name: {}", label.to_lowercase(), name),
            ));
        }
    }
}

/// Check a definition and return every violated rule
pub fn validate(def: &TableDefinition, policy: &ValidationPolicy) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if def.schema.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Table name is required"));
    }

    if policy.require_relation_endpoints {
        if let TableKind::Relation { from, to, .. } = &def.schema.kind {
            if from.iter().all(|t| t.trim().is_empty()) {
                errors.push(ValidationError::new(
                    "kind.in",
                    "Relation tables require an incoming table",
                ));
            }
            if to.iter().all(|t| t.trim().is_empty()) {
                errors.push(ValidationError::new(
                    "kind.out",
                    "Relation tables require an outgoing table",
                ));
            }
        }
    }

    if let Some(cf) = def.schema.active_changefeed() {
        if cf.expiry.trim().is_empty() {
            errors.push(ValidationError::new(
                "changefeed.expiry",
                "Change feed retention is required",
            ));
        }
    }

    check_names(
        &mut errors,
        "fields",
        "Field",
        def.fields.iter().map(|f| f.name.as_str()),
    );
    check_names(
        &mut errors,
        "indexes",
        "Index",
        def.indexes.iter().map(|i| i.name.as_str()),
    );
    check_names(
        &mut errors,
        "events",
        "Event",
        def.events.iter().map(|e| e.name.as_str()),
    );

    for (i, index) in def.indexes.iter().enumerate() {
        if index.fields.iter().all(|f| f.trim().is_empty()) {
            errors.push(ValidationError::new(
                format!("indexes[{}].fields", i),
                format!("Index {} must cover at least one field", i + 1),
            ));
        }
        match &index.kind {
            IndexKind::Search { analyzer, .. } if analyzer.trim().is_empty() => {
                errors.push(ValidationError::new(
                    format!("indexes[{}].analyzer", i),
                    format!("Index {} requires an analyzer", i + 1),
                ));
            }
            IndexKind::Vector { dimension: 0, .. } => {
                errors.push(ValidationError::new(
                    format!("indexes[{}].dimension", i),
                    format!("Index {} dimension must be positive", i + 1),
                ));
            }
            _ => {}
        }
    }

    for (i, event) in def.events.iter().enumerate() {
        if event.then.iter().all(|a| a.trim().is_empty()) {
            errors.push(ValidationError::new(
                format!("events[{}].then", i),
                format!("Event {} requires at least one action", i + 1),
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDefinition, FieldDefinition, IndexDefinition};

    #[test]
    fn test_valid_definition() {
        let def = TableDefinition::new("person")
            .with_field(FieldDefinition::named("name").kind("string"))
            .with_index(IndexDefinition::named("name_idx").field("name"))
            .with_event(EventDefinition::named("audit").then("CREATE log"));

        assert!(validate(&def, &ValidationPolicy::default()).is_empty());
    }

    #[test]
    fn test_empty_table_name() {
        let errors = validate(&TableDefinition::default(), &ValidationPolicy::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_duplicate_names_are_checked_per_collection() {
        let def = TableDefinition::new("person")
            .with_field(FieldDefinition::named("name"))
            .with_field(FieldDefinition::named("name"))
            .with_index(IndexDefinition::named("name").field("name"));

        let errors = validate(&def, &ValidationPolicy::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Duplicate field name: name");
    }

    #[test]
    fn test_empty_child_names() {
        let def = TableDefinition::new("person")
            .with_field(FieldDefinition::named(""))
            .with_event(EventDefinition::named(" ").then("CREATE log"));

        let errors = validate(&def, &ValidationPolicy::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["fields[0].name", "events[0].name"]);
    }

    #[test]
    fn test_relation_endpoints_follow_policy() {
        let mut def = TableDefinition::new("likes");
        def.schema.kind = TableKind::Relation {
            from: vec![],
            to: vec!["post".into()],
            enforced: false,
        };

        assert!(validate(&def, &ValidationPolicy::default()).is_empty());

        let strict = ValidationPolicy {
            require_relation_endpoints: true,
        };
        let errors = validate(&def, &strict);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "kind.in");
    }

    #[test]
    fn test_index_and_event_shape() {
        let def = TableDefinition::new("doc")
            .with_index(IndexDefinition::named("empty"))
            .with_index(IndexDefinition::named("ft").field("body").search(""))
            .with_event(EventDefinition::named("noop").when("true"));

        let errors = validate(&def, &ValidationPolicy::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["indexes[0].fields", "indexes[1].analyzer", "events[0].then"]
        );
    }
}
