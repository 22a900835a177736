//! Typed definition statements and their rendering
//!
//! The compiler produces [`DdlStatement`] values; `Display` renders each one
//! to the statement text sent to the backend.

use std::fmt;

use tabula_core::ident::{quote_field_path, quote_ident, quote_string};

use crate::models::{
    EventDefinition, FieldDefinition, IndexDefinition, IndexKind, TableKind, TableSchema,
};

/// Object a statement acts on, in the order statements must be emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatementTarget {
    Table,
    Field,
    Index,
    Event,
}

/// A single definition statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    /// Overwrite every table-wide attribute
    DefineTable { schema: TableSchema },
    RemoveTable { table: String, if_exists: bool },
    DefineField { table: String, field: FieldDefinition },
    RemoveField { table: String, name: String, if_exists: bool },
    DefineIndex { table: String, index: IndexDefinition },
    RemoveIndex { table: String, name: String, if_exists: bool },
    DefineEvent { table: String, event: EventDefinition },
    RemoveEvent { table: String, name: String, if_exists: bool },
}

impl DdlStatement {
    pub fn target(&self) -> StatementTarget {
        match self {
            DdlStatement::DefineTable { .. } | DdlStatement::RemoveTable { .. } => {
                StatementTarget::Table
            }
            DdlStatement::DefineField { .. } | DdlStatement::RemoveField { .. } => {
                StatementTarget::Field
            }
            DdlStatement::DefineIndex { .. } | DdlStatement::RemoveIndex { .. } => {
                StatementTarget::Index
            }
            DdlStatement::DefineEvent { .. } | DdlStatement::RemoveEvent { .. } => {
                StatementTarget::Event
            }
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(
            self,
            DdlStatement::RemoveTable { .. }
                | DdlStatement::RemoveField { .. }
                | DdlStatement::RemoveIndex { .. }
                | DdlStatement::RemoveEvent { .. }
        )
    }

    /// Name of the table, field, index or event the statement acts on
    pub fn object_name(&self) -> &str {
        match self {
            DdlStatement::DefineTable { schema } => &schema.name,
            DdlStatement::RemoveTable { table, .. } => table,
            DdlStatement::DefineField { field, .. } => &field.name,
            DdlStatement::DefineIndex { index, .. } => &index.name,
            DdlStatement::DefineEvent { event, .. } => &event.name,
            DdlStatement::RemoveField { name, .. }
            | DdlStatement::RemoveIndex { name, .. }
            | DdlStatement::RemoveEvent { name, .. } => name,
        }
    }
}

/// Render a permission rule: empty is unrestricted, `NONE`/`FULL` are kept,
/// anything else is a `WHERE` condition.
fn permission_rule(rule: &str) -> String {
    let rule = rule.trim();
    if rule.is_empty() || rule.eq_ignore_ascii_case("FULL") {
        return "FULL".to_string();
    }
    if rule.eq_ignore_ascii_case("NONE") {
        return "NONE".to_string();
    }
    let has_where = rule
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("WHERE "));
    if has_where {
        rule.to_string()
    } else {
        format!("WHERE {}", rule)
    }
}

/// Non-empty expression, if any
fn expr(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn write_comment(f: &mut fmt::Formatter<'_>, comment: &Option<String>) -> fmt::Result {
    match expr(comment) {
        Some(comment) => write!(f, " COMMENT {}", quote_string(comment)),
        None => Ok(()),
    }
}

fn write_remove(
    f: &mut fmt::Formatter<'_>,
    object: &str,
    name: &str,
    table: &str,
    if_exists: bool,
) -> fmt::Result {
    write!(f, "REMOVE {}", object)?;
    if if_exists {
        f.write_str(" IF EXISTS")?;
    }
    write!(f, " {} ON TABLE {}", name, quote_ident(table))
}

fn write_table(f: &mut fmt::Formatter<'_>, schema: &TableSchema) -> fmt::Result {
    write!(f, "DEFINE TABLE {}", quote_ident(&schema.name))?;

    if schema.drop {
        f.write_str(" DROP")?;
    }
    f.write_str(if schema.full {
        " SCHEMAFULL"
    } else {
        " SCHEMALESS"
    })?;

    write!(f, " TYPE {}", schema.kind.keyword())?;
    if let TableKind::Relation { from, to, enforced } = &schema.kind {
        let join = |tables: &[String]| {
            tables
                .iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| quote_ident(t))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let from = join(from.as_slice());
        let to = join(to.as_slice());
        if !from.is_empty() {
            write!(f, " IN {}", from)?;
        }
        if !to.is_empty() {
            write!(f, " OUT {}", to)?;
        }
        if *enforced {
            f.write_str(" ENFORCED")?;
        }
    }

    if let Some(cf) = schema.active_changefeed() {
        write!(f, " CHANGEFEED {}", cf.expiry.trim())?;
        if cf.include_original {
            f.write_str(" INCLUDE ORIGINAL")?;
        }
    }

    write_comment(f, &schema.comment)?;

    f.write_str(" PERMISSIONS")?;
    for (action, rule) in schema.permissions.rules() {
        write!(f, " FOR {} {}", action, permission_rule(rule))?;
    }
    Ok(())
}

fn write_field(f: &mut fmt::Formatter<'_>, table: &str, field: &FieldDefinition) -> fmt::Result {
    write!(
        f,
        "DEFINE FIELD {} ON TABLE {}",
        quote_field_path(&field.name),
        quote_ident(table)
    )?;

    if field.flexible {
        f.write_str(" FLEXIBLE")?;
    }
    if let Some(kind) = expr(&field.kind) {
        write!(f, " TYPE {}", kind)?;
    }
    if let Some(default) = expr(&field.default) {
        write!(f, " DEFAULT {}", default)?;
    }
    if field.readonly {
        f.write_str(" READONLY")?;
    }
    if let Some(value) = expr(&field.value) {
        write!(f, " VALUE {}", value)?;
    }
    if let Some(assert) = expr(&field.assert) {
        write!(f, " ASSERT {}", assert)?;
    }

    write_comment(f, &field.comment)?;

    if let Some(permissions) = &field.permissions {
        f.write_str(" PERMISSIONS")?;
        for (action, rule) in permissions.rules() {
            write!(f, " FOR {} {}", action, permission_rule(rule))?;
        }
    }
    Ok(())
}

fn write_index(f: &mut fmt::Formatter<'_>, table: &str, index: &IndexDefinition) -> fmt::Result {
    let fields = index
        .fields
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| quote_field_path(name))
        .collect::<Vec<_>>()
        .join(", ");

    write!(
        f,
        "DEFINE INDEX {} ON TABLE {} FIELDS {}",
        quote_ident(&index.name),
        quote_ident(table),
        fields
    )?;

    match &index.kind {
        IndexKind::Normal => {}
        IndexKind::Unique => f.write_str(" UNIQUE")?,
        IndexKind::Search {
            analyzer,
            highlights,
        } => {
            write!(f, " SEARCH ANALYZER {} BM25", quote_ident(analyzer))?;
            if *highlights {
                f.write_str(" HIGHLIGHTS")?;
            }
        }
        IndexKind::Vector {
            algorithm,
            dimension,
            distance,
        } => {
            write!(
                f,
                " {} DIMENSION {} DIST {}",
                algorithm.keyword(),
                dimension,
                distance.keyword()
            )?;
        }
    }

    write_comment(f, &index.comment)
}

fn write_event(f: &mut fmt::Formatter<'_>, table: &str, event: &EventDefinition) -> fmt::Result {
    let condition = event.when.trim();
    let actions = event
        .then
        .iter()
        .map(|action| action.trim())
        .filter(|action| !action.is_empty())
        .map(|action| format!("({})", action))
        .collect::<Vec<_>>()
        .join(", ");

    write!(
        f,
        "DEFINE EVENT {} ON TABLE {} WHEN {} THEN {}",
        quote_ident(&event.name),
        quote_ident(table),
        if condition.is_empty() { "true" } else { condition },
        actions
    )?;

    write_comment(f, &event.comment)
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdlStatement::DefineTable { schema } => write_table(f, schema),
            DdlStatement::RemoveTable { table, if_exists } => {
                f.write_str("REMOVE TABLE")?;
                if *if_exists {
                    f.write_str(" IF EXISTS")?;
                }
                write!(f, " {}", quote_ident(table))
            }
            DdlStatement::DefineField { table, field } => write_field(f, table, field),
            DdlStatement::RemoveField {
                table,
                name,
                if_exists,
            } => write_remove(f, "FIELD", &quote_field_path(name), table, *if_exists),
            DdlStatement::DefineIndex { table, index } => write_index(f, table, index),
            DdlStatement::RemoveIndex {
                table,
                name,
                if_exists,
            } => write_remove(f, "INDEX", &quote_ident(name), table, *if_exists),
            DdlStatement::DefineEvent { table, event } => write_event(f, table, event),
            DdlStatement::RemoveEvent {
                table,
                name,
                if_exists,
            } => write_remove(f, "EVENT", &quote_ident(name), table, *if_exists),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Changefeed, DistanceMetric, FieldPermissions, Permissions, VectorAlgorithm,
    };

    fn render(statement: DdlStatement) -> String {
        statement.to_string()
    }

    #[test]
    fn test_define_table_minimal() {
        let sql = render(DdlStatement::DefineTable {
            schema: TableSchema::new("person"),
        });
        assert_eq!(
            sql,
            "DEFINE TABLE person SCHEMALESS TYPE ANY PERMISSIONS FOR select FULL FOR create FULL FOR update FULL FOR delete FULL"
        );
    }

    #[test]
    fn test_define_table_full_attribute_set() {
        let schema = TableSchema {
            name: "likes".into(),
            drop: true,
            full: true,
            kind: TableKind::Relation {
                from: vec!["user".into(), "admin".into()],
                to: vec!["post".into()],
                enforced: true,
            },
            permissions: Permissions {
                select: "published = true".into(),
                create: "WHERE $auth.id != NONE".into(),
                update: "none".into(),
                delete: "NONE".into(),
            },
            changefeed: Some(Changefeed::retain("3d").with_original()),
            comment: Some("who likes what".into()),
        };

        assert_eq!(
            render(DdlStatement::DefineTable { schema }),
            "DEFINE TABLE likes DROP SCHEMAFULL TYPE RELATION IN user | admin OUT post ENFORCED \
             CHANGEFEED 3d INCLUDE ORIGINAL COMMENT \"who likes what\" \
             PERMISSIONS FOR select WHERE published = true FOR create WHERE $auth.id != NONE \
             FOR update NONE FOR delete NONE"
        );
    }

    #[test]
    fn test_define_field_clauses() {
        let field = FieldDefinition::named("email")
            .kind("string")
            .default_value("''")
            .value("string::lowercase($value)")
            .assert("string::is::email($value)")
            .readonly()
            .with_permissions(FieldPermissions {
                select: "".into(),
                create: "".into(),
                update: "NONE".into(),
            });

        assert_eq!(
            render(DdlStatement::DefineField {
                table: "person".into(),
                field,
            }),
            "DEFINE FIELD email ON TABLE person TYPE string DEFAULT '' READONLY \
             VALUE string::lowercase($value) ASSERT string::is::email($value) \
             PERMISSIONS FOR select FULL FOR create FULL FOR update NONE"
        );
    }

    #[test]
    fn test_define_field_minimal() {
        assert_eq!(
            render(DdlStatement::DefineField {
                table: "person".into(),
                field: FieldDefinition::named("nick").kind("string"),
            }),
            "DEFINE FIELD nick ON TABLE person TYPE string"
        );
    }

    #[test]
    fn test_define_indexes() {
        let unique = IndexDefinition::named("email_idx").field("email").unique();
        assert_eq!(
            render(DdlStatement::DefineIndex {
                table: "person".into(),
                index: unique,
            }),
            "DEFINE INDEX email_idx ON TABLE person FIELDS email UNIQUE"
        );

        let mut search = IndexDefinition::named("body_ft").field("title").field("body");
        search.kind = IndexKind::Search {
            analyzer: "english".into(),
            highlights: true,
        };
        assert_eq!(
            render(DdlStatement::DefineIndex {
                table: "post".into(),
                index: search,
            }),
            "DEFINE INDEX body_ft ON TABLE post FIELDS title, body SEARCH ANALYZER english BM25 HIGHLIGHTS"
        );

        let vector = IndexDefinition::named("embedding_idx").field("embedding").vector(
            VectorAlgorithm::Hnsw,
            384,
            DistanceMetric::Cosine,
        );
        assert_eq!(
            render(DdlStatement::DefineIndex {
                table: "post".into(),
                index: vector,
            }),
            "DEFINE INDEX embedding_idx ON TABLE post FIELDS embedding HNSW DIMENSION 384 DIST COSINE"
        );
    }

    #[test]
    fn test_define_event() {
        let event = EventDefinition::named("audit")
            .when("$event = \"UPDATE\"")
            .then("CREATE log SET at = time::now()")
            .then("UPDATE stats SET edits += 1");

        assert_eq!(
            render(DdlStatement::DefineEvent {
                table: "person".into(),
                event,
            }),
            "DEFINE EVENT audit ON TABLE person WHEN $event = \"UPDATE\" \
             THEN (CREATE log SET at = time::now()), (UPDATE stats SET edits += 1)"
        );

        let always = EventDefinition::named("touch").then("CREATE log");
        assert_eq!(
            render(DdlStatement::DefineEvent {
                table: "person".into(),
                event: always,
            }),
            "DEFINE EVENT touch ON TABLE person WHEN true THEN (CREATE log)"
        );
    }

    #[test]
    fn test_remove_statements() {
        assert_eq!(
            render(DdlStatement::RemoveTable {
                table: "person".into(),
                if_exists: false,
            }),
            "REMOVE TABLE person"
        );
        assert_eq!(
            render(DdlStatement::RemoveField {
                table: "person".into(),
                name: "age".into(),
                if_exists: false,
            }),
            "REMOVE FIELD age ON TABLE person"
        );
        assert_eq!(
            render(DdlStatement::RemoveIndex {
                table: "my table".into(),
                name: "age_idx".into(),
                if_exists: true,
            }),
            "REMOVE INDEX IF EXISTS age_idx ON TABLE `my table`"
        );
    }

    #[test]
    fn test_targets() {
        let statement = DdlStatement::RemoveEvent {
            table: "person".into(),
            name: "audit".into(),
            if_exists: false,
        };
        assert_eq!(statement.target(), StatementTarget::Event);
        assert!(statement.is_remove());
        assert_eq!(statement.object_name(), "audit");
    }
}
