//! Table-level attributes: storage flags, kind, permissions and change-feed

use serde::{Deserialize, Serialize};

/// What kind of records a table holds
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum TableKind {
    /// Either regular records or edges
    #[default]
    Any,
    /// Regular records only
    Normal,
    /// Edge table connecting records of other tables
    Relation {
        /// Tables the edge may start from (empty = unrestricted)
        #[serde(rename = "in", default)]
        from: Vec<String>,
        /// Tables the edge may point to (empty = unrestricted)
        #[serde(rename = "out", default)]
        to: Vec<String>,
        /// Whether the backend checks that endpoint records exist
        #[serde(default)]
        enforced: bool,
    },
}

impl TableKind {
    /// Relation kind with a single table on each side
    pub fn relation(from: impl Into<String>, to: impl Into<String>) -> Self {
        TableKind::Relation {
            from: vec![from.into()],
            to: vec![to.into()],
            enforced: false,
        }
    }

    /// Keyword used in `TYPE <kind>`
    pub fn keyword(&self) -> &'static str {
        match self {
            TableKind::Any => "ANY",
            TableKind::Normal => "NORMAL",
            TableKind::Relation { .. } => "RELATION",
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, TableKind::Relation { .. })
    }
}

/// Access rules for the four record operations.
///
/// Each rule is an opaque expression owned by the backend grammar. An empty
/// rule means no restriction, `"NONE"` denies everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub select: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl Permissions {
    /// Full access for every operation
    pub fn full() -> Self {
        Self::default()
    }

    /// Every operation denied
    pub fn none() -> Self {
        Self {
            select: "NONE".to_string(),
            create: "NONE".to_string(),
            update: "NONE".to_string(),
            delete: "NONE".to_string(),
        }
    }

    /// Rules in statement order
    pub fn rules(&self) -> [(&'static str, &str); 4] {
        [
            ("select", &self.select),
            ("create", &self.create),
            ("update", &self.update),
            ("delete", &self.delete),
        ]
    }
}

/// Change-feed settings of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changefeed {
    pub enabled: bool,
    /// Retention window as a backend duration literal, e.g. `1d` or `6h`
    pub expiry: String,
    /// Whether each change also carries the record's previous value
    #[serde(default)]
    pub include_original: bool,
}

impl Changefeed {
    /// Enabled change-feed with the given retention
    pub fn retain(expiry: impl Into<String>) -> Self {
        Self {
            enabled: true,
            expiry: expiry.into(),
            include_original: false,
        }
    }

    /// Builder: also store original values
    pub fn with_original(mut self) -> Self {
        self.include_original = true;
        self
    }
}

/// Identity and table-wide attributes of a definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Records written to the table are discarded
    #[serde(default)]
    pub drop: bool,
    /// Only declared fields are accepted
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub kind: TableKind,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefeed: Option<Changefeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Change-feed settings that are switched on, if any
    pub fn active_changefeed(&self) -> Option<&Changefeed> {
        self.changefeed.as_ref().filter(|cf| cf.enabled)
    }

    /// Copy with a switched-off change-feed dropped, so that two schemas
    /// rendering the same statement compare equal
    pub fn normalized(&self) -> Self {
        Self {
            changefeed: self.active_changefeed().cloned(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keywords() {
        assert_eq!(TableKind::Any.keyword(), "ANY");
        assert_eq!(TableKind::Normal.keyword(), "NORMAL");
        assert_eq!(TableKind::relation("user", "post").keyword(), "RELATION");
    }

    #[test]
    fn test_schema_deserializes_relation_kind() {
        let schema: TableSchema = serde_json::from_str(
            r#"{"name":"likes","full":true,"kind":{"kind":"RELATION","in":["user"],"out":["post"],"enforced":true}}"#,
        )
        .unwrap();

        assert_eq!(schema.name, "likes");
        assert!(schema.full);
        assert_eq!(
            schema.kind,
            TableKind::Relation {
                from: vec!["user".into()],
                to: vec!["post".into()],
                enforced: true,
            }
        );
    }

    #[test]
    fn test_disabled_changefeed_is_inactive() {
        let mut schema = TableSchema::new("person");
        schema.changefeed = Some(Changefeed {
            enabled: false,
            expiry: "1d".into(),
            include_original: false,
        });
        assert!(schema.active_changefeed().is_none());

        schema.changefeed = Some(Changefeed::retain("1d"));
        assert!(schema.active_changefeed().is_some());
    }

    #[test]
    fn test_normalized_drops_disabled_changefeed() {
        let mut schema = TableSchema::new("person");
        schema.changefeed = Some(Changefeed {
            enabled: false,
            expiry: "1d".into(),
            include_original: true,
        });
        assert_eq!(schema.normalized(), TableSchema::new("person"));

        schema.changefeed = Some(Changefeed::retain("1d"));
        assert_eq!(schema.normalized(), schema);
    }
}
