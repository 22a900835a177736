//! Designer configuration
//!
//! Loaded from TOML. Every section is optional; missing keys fall back to
//! the defaults below.
//!
//! ```toml
//! error_prefix = "There was a problem with the database: "
//!
//! [compiler]
//! observed_fields = "skip"
//! remove_if_exists = true
//! remove_table_if_exists = false
//!
//! [validation]
//! require_relation_endpoints = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabula_core::DEFAULT_ERROR_PREFIX;

use crate::error::{DesignerError, DesignerResult};
use crate::models::ValidationPolicy;

/// How fields only observed on records of a schemaless table are compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedFieldPolicy {
    /// Unchanged or dropped observed fields produce no statement. Added or
    /// edited ones are defined.
    #[default]
    Skip,
    /// Diff them like declared fields, removals included
    Define,
}

/// Options for the definition compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub observed_fields: ObservedFieldPolicy,
    /// Emit `REMOVE FIELD|INDEX|EVENT ... IF EXISTS` so a retried batch
    /// tolerates objects the failed attempt already removed
    pub remove_if_exists: bool,
    /// Emit `REMOVE TABLE IF EXISTS`
    pub remove_table_if_exists: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            observed_fields: ObservedFieldPolicy::Skip,
            remove_if_exists: true,
            remove_table_if_exists: false,
        }
    }
}

/// Top-level designer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    pub compiler: CompileOptions,
    pub validation: ValidationPolicy,
    /// Boilerplate stripped from backend failure messages
    pub error_prefix: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            compiler: CompileOptions::default(),
            validation: ValidationPolicy::default(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }
}

impl DesignerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> DesignerResult<Self> {
        toml::from_str(text).map_err(|e| DesignerError::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> DesignerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DesignerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded designer config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DesignerConfig::default();
        assert_eq!(config.compiler.observed_fields, ObservedFieldPolicy::Skip);
        assert!(config.compiler.remove_if_exists);
        assert!(!config.compiler.remove_table_if_exists);
        assert!(!config.validation.require_relation_endpoints);
        assert_eq!(config.error_prefix, DEFAULT_ERROR_PREFIX);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DesignerConfig::from_toml_str(indoc! {r#"
            [compiler]
            remove_if_exists = false
        "#})
        .unwrap();

        assert!(!config.compiler.remove_if_exists);
        assert!(!config.compiler.remove_table_if_exists);
        assert_eq!(config.compiler.observed_fields, ObservedFieldPolicy::Skip);
        assert_eq!(config.error_prefix, DEFAULT_ERROR_PREFIX);
    }

    #[test]
    fn test_full_toml() {
        let config = DesignerConfig::from_toml_str(indoc! {r#"
            error_prefix = "db error: "

            [compiler]
            observed_fields = "define"

            [validation]
            require_relation_endpoints = true
        "#})
        .unwrap();

        assert_eq!(config.error_prefix, "db error: ");
        assert_eq!(config.compiler.observed_fields, ObservedFieldPolicy::Define);
        assert!(config.validation.require_relation_endpoints);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DesignerConfig::from_toml_str("[compiler]\nobserved_fields = 3").unwrap_err();
        assert!(matches!(err, DesignerError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compiler]\nobserved_fields = \"define\"").unwrap();

        let config = DesignerConfig::load(file.path()).unwrap();
        assert_eq!(config.compiler.observed_fields, ObservedFieldPolicy::Define);

        let missing = DesignerConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(DesignerError::Config(_))));
    }
}
