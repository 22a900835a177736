//! Statement executor adapter
//!
//! The designer never talks to the backend directly. It hands an ordered
//! batch of definition statements to a [`StatementExecutor`] and receives one
//! [`StatementOutcome`] per statement back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Boilerplate the backend puts in front of every failure message.
pub const DEFAULT_ERROR_PREFIX: &str = "There was a problem with the database: ";

/// Outcome of a single statement within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum StatementOutcome {
    /// The statement was applied
    Success,
    /// The backend rejected the statement with the given message
    Failure(String),
}

impl StatementOutcome {
    /// Convenience constructor for a failed outcome
    pub fn failure(message: impl Into<String>) -> Self {
        StatementOutcome::Failure(message.into())
    }

    /// Whether the statement was applied
    pub fn is_success(&self) -> bool {
        matches!(self, StatementOutcome::Success)
    }

    /// The failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            StatementOutcome::Success => None,
            StatementOutcome::Failure(message) => Some(message),
        }
    }
}

/// An already-connected request/response channel to the backend.
///
/// Implementations execute the whole batch in order and must report an
/// outcome for every statement, even when an earlier one failed. An `Err`
/// return means the call itself failed (connection dropped, transport error)
/// and nothing is known about individual statements.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Execute `statements` as one batch, returning one outcome per statement
    /// in the same order.
    async fn execute(&self, statements: &[String]) -> Result<Vec<StatementOutcome>>;
}

/// Remove the backend's boilerplate prefix from the start of a failure
/// message.
///
/// Only a leading prefix is removed, and only once. A message that starts
/// with a word-aligned tail of the prefix of at least two words (for example
/// `"the database: "`) has that tail removed instead. Anything else is
/// returned verbatim.
pub fn strip_error_prefix(message: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return message.to_string();
    }

    if let Some(rest) = message.strip_prefix(prefix) {
        return rest.to_string();
    }

    let tails = prefix
        .char_indices()
        .filter(|(_, c)| *c == ' ')
        .map(|(i, _)| &prefix[i + 1..])
        .filter(|tail| tail.trim().contains(' '));

    for tail in tails {
        if let Some(rest) = message.strip_prefix(tail) {
            return rest.to_string();
        }
    }

    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_full_prefix() {
        let message = "There was a problem with the database: duplicate index";
        assert_eq!(
            strip_error_prefix(message, DEFAULT_ERROR_PREFIX),
            "duplicate index"
        );
    }

    #[test]
    fn test_strip_prefix_tail() {
        let message = "problem with the database: duplicate index";
        assert_eq!(
            strip_error_prefix(message, DEFAULT_ERROR_PREFIX),
            "duplicate index"
        );
    }

    #[test]
    fn test_strip_only_leading_prefix() {
        let message = "A: There was a problem with the database: B";
        assert_eq!(strip_error_prefix(message, DEFAULT_ERROR_PREFIX), message);

        let twice = "There was a problem with the database: There was a problem with the database: B";
        assert_eq!(
            strip_error_prefix(twice, DEFAULT_ERROR_PREFIX),
            "There was a problem with the database: B"
        );
    }

    #[test]
    fn test_strip_keeps_single_word_tail() {
        let message = "database: ready check failed";
        assert_eq!(strip_error_prefix(message, DEFAULT_ERROR_PREFIX), message);

        let message = "the database: ready check failed";
        assert_eq!(
            strip_error_prefix(message, DEFAULT_ERROR_PREFIX),
            "ready check failed"
        );
    }

    #[test]
    fn test_strip_leaves_unrelated_messages() {
        let message = "The table 'person' does not exist";
        assert_eq!(strip_error_prefix(message, DEFAULT_ERROR_PREFIX), message);
        assert_eq!(strip_error_prefix(message, ""), message);
    }

    #[test]
    fn test_strip_keeps_multiline_body() {
        let message = "There was a problem with the database: Parse error\n  --> [1:8]";
        assert_eq!(
            strip_error_prefix(message, DEFAULT_ERROR_PREFIX),
            "Parse error\n  --> [1:8]"
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = StatementOutcome::Success;
        let failed = StatementOutcome::failure("boom");

        assert!(ok.is_success());
        assert_eq!(ok.message(), None);
        assert!(!failed.is_success());
        assert_eq!(failed.message(), Some("boom"));
    }

    #[test]
    fn test_outcome_decodes_from_json() {
        let outcomes: Vec<StatementOutcome> = serde_json::from_str(
            r#"[{"status":"success"},{"status":"failure","message":"nope"}]"#,
        )
        .unwrap();

        assert_eq!(
            outcomes,
            vec![StatementOutcome::Success, StatementOutcome::failure("nope")]
        );
    }
}
