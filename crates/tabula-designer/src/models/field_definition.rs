//! Field definition model

use serde::{Deserialize, Serialize};

/// Where a field definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    /// Declared with a definition statement
    #[default]
    Declared,
    /// Seen on records of a schemaless table but never declared
    Observed,
}

/// Per-field permission overrides
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPermissions {
    pub select: String,
    pub create: String,
    pub update: String,
}

impl FieldPermissions {
    /// Rules in statement order
    pub fn rules(&self) -> [(&'static str, &str); 3] {
        [
            ("select", &self.select),
            ("create", &self.create),
            ("update", &self.update),
        ]
    }
}

/// Field definition model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name or nested path (e.g. `address.city`, `tags[*]`)
    pub name: String,
    /// Declared type, e.g. `string`, `option<int>`, `array<record<user>>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Accept nested values of any shape (schemafull tables only)
    #[serde(default)]
    pub flexible: bool,
    #[serde(default)]
    pub readonly: bool,
    /// Default value expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Value transform expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Assertion expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<FieldPermissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub origin: FieldOrigin,
}

impl FieldDefinition {
    /// Create a field with a specific name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set declared type
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Builder: set default value expression
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Builder: set value transform
    pub fn value(mut self, expr: impl Into<String>) -> Self {
        self.value = Some(expr.into());
        self
    }

    /// Builder: set assertion
    pub fn assert(mut self, expr: impl Into<String>) -> Self {
        self.assert = Some(expr.into());
        self
    }

    /// Builder: mark as flexible
    pub fn flexible(mut self) -> Self {
        self.flexible = true;
        self
    }

    /// Builder: mark as readonly
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Builder: set permission overrides
    pub fn with_permissions(mut self, permissions: FieldPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Builder: mark as observed on records rather than declared
    pub fn observed(mut self) -> Self {
        self.origin = FieldOrigin::Observed;
        self
    }

    /// Copy of this field with the flags a table of the given mode cannot
    /// carry cleared. `FLEXIBLE` only means something on schemafull tables.
    pub fn normalized_for(&self, schemafull: bool) -> Self {
        let mut field = self.clone();
        if !schemafull {
            field.flexible = false;
        }
        field
    }
}
