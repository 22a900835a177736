//! Designer error types

use thiserror::Error;

use crate::models::ValidationError;
use crate::session::{SessionOperation, SessionState};

/// Result type for designer operations
pub type DesignerResult<T> = Result<T, DesignerError>;

fn join_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced by the designer
#[derive(Debug, Error)]
pub enum DesignerError {
    /// The draft failed validation; nothing was sent to the backend
    #[error("Definition is invalid: {}", join_violations(.0))]
    Validation(Vec<ValidationError>),

    /// One or more statements were rejected, one message per statement
    #[error("{} statement(s) rejected: {}", .0.len(), .0.join("; "))]
    StatementsRejected(Vec<String>),

    /// The executor call itself failed
    #[error("Failed to apply schema: {0}")]
    Transport(String),

    /// An operation was invoked in a state that does not allow it
    #[error("Cannot {operation} while the session is {state}")]
    SessionMisuse {
        operation: SessionOperation,
        state: SessionState,
    },

    /// An edit tried to rename a table that already exists
    #[error("Table '{current}' cannot be renamed to '{requested}'")]
    ImmutableName { current: String, requested: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DesignerError {
    /// Messages suitable for display, one per line item
    pub fn messages(&self) -> Vec<String> {
        match self {
            DesignerError::Validation(errors) => errors.iter().map(|e| e.to_string()).collect(),
            DesignerError::StatementsRejected(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
