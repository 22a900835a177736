use tabula_designer::DesignerError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Table '{0}' is already being edited")]
    SessionAlreadyOpen(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Schema loading failed: {0}")]
    SchemaLoadFailed(String),

    #[error("Table operation failed: {0}")]
    TableOperationFailed(String),

    #[error(transparent)]
    Designer(#[from] DesignerError),
}

impl ServiceError {
    /// Messages suitable for display, one per line item
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Designer(err) => err.messages(),
            other => vec![other.to_string()],
        }
    }
}
